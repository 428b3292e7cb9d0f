//! Markdown report generation
//!
//! Issues from one run are written to a single markdown file next to the
//! repository root, sorted by severity, each with the offending code slice
//! inlined. The console gets a short per-severity summary.

use crate::review::{FileFailure, Issue, RunOutcome, Severity};
use anyhow::Context;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORT_FILE: &str = "difflens_report.md";

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::Warning => "🟡",
        Severity::Minor => "🔵",
    }
}

fn language_tag(path: &str) -> &'static str {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("rs") => "rust",
        Some("go") => "go",
        Some("py") | Some("pyi") => "python",
        Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => "javascript",
        Some("ts") | Some("tsx") => "typescript",
        Some("json") => "json",
        Some("toml") => "toml",
        Some("yaml") | Some("yml") => "yaml",
        Some("sh") => "sh",
        Some("md") => "markdown",
        _ => "",
    }
}

/// Slice `[start_line, end_line]` (1-based, inclusive) out of a file.
/// Returns None when the range does not fit the file.
fn code_slice(root: &Path, file_path: &str, start_line: usize, end_line: usize) -> Option<String> {
    if start_line == 0 || start_line > end_line {
        return None;
    }
    let content = fs::read_to_string(root.join(file_path)).ok()?;
    let lines: Vec<&str> = content.lines().collect();
    if start_line > lines.len() {
        return None;
    }
    let hi = end_line.min(lines.len());
    Some(lines[start_line - 1..hi].join("\n"))
}

/// Write the markdown report and return its path.
pub fn write_report(
    issues: &[Issue],
    failures: &[FileFailure],
    root: &Path,
) -> anyhow::Result<PathBuf> {
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.file_path.cmp(&b.file_path))
            .then_with(|| a.start_line.cmp(&b.start_line))
    });

    let mut out = String::new();
    out.push_str("# Code Review Report\n\n");

    if sorted.is_empty() {
        out.push_str("No issues found. ✅\n");
    } else {
        let count = |s| sorted.iter().filter(|i| i.severity == s).count();
        let _ = writeln!(
            out,
            "**{} issue(s)**: {} critical, {} warning, {} minor\n",
            sorted.len(),
            count(Severity::Critical),
            count(Severity::Warning),
            count(Severity::Minor)
        );

        for issue in &sorted {
            let _ = writeln!(
                out,
                "## {} {}: {}\n",
                severity_icon(issue.severity),
                issue.severity.label(),
                issue.file_path
            );
            let _ = writeln!(out, "**Lines {}-{}**\n", issue.start_line, issue.end_line);
            let _ = writeln!(out, "{}\n", issue.description.trim());
            match code_slice(root, &issue.file_path, issue.start_line, issue.end_line) {
                Some(code) => {
                    let _ = writeln!(out, "```{}\n{}\n```\n", language_tag(&issue.file_path), code);
                }
                None => {
                    let _ = writeln!(
                        out,
                        "_Could not extract code for lines {}-{}._\n",
                        issue.start_line, issue.end_line
                    );
                }
            }
        }
    }

    if !failures.is_empty() {
        out.push_str("## Files not reviewed\n\n");
        for failure in failures {
            let _ = writeln!(out, "- `{}`: {}", failure.file_path, failure.error);
        }
    }

    let path = root.join(REPORT_FILE);
    fs::write(&path, out).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Print the end-of-run summary to the console.
pub fn print_summary(outcome: &RunOutcome, report_path: Option<&Path>) {
    println!();
    if outcome.issues.is_empty() {
        println!(
            "✅ No issues found across {} reviewed file(s).",
            outcome.reviewed_files
        );
    } else {
        for severity in [Severity::Critical, Severity::Warning, Severity::Minor] {
            let count = outcome.issues.iter().filter(|i| i.severity == severity).count();
            if count > 0 {
                println!("  {} {}: {}", severity_icon(severity), severity.label(), count);
            }
        }
        if let Some(path) = report_path {
            println!("\nFull report: {}", path.display());
        }
    }
    if !outcome.failures.is_empty() {
        println!("⚠️  {} file(s) could not be reviewed.", outcome.failures.len());
    }
}
