//! Cross-reference search
//!
//! Finds textual occurrences of an identifier across the project. The
//! primary backend shells out to `git grep`; a walkdir scan covers trees
//! that are not git repositories. Callers treat failures as "no usages",
//! so neither backend is allowed to take the review down.

use anyhow::Context;
use regex::Regex;
use std::path::Path;
use std::process::Command;
use walkdir::WalkDir;

/// One textual occurrence of an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub file_path: String,
    pub line_number: usize,
}

/// Project-wide identifier search.
pub trait XrefSearch {
    fn find_occurrences(&self, identifier: &str, root: &Path) -> anyhow::Result<Vec<Occurrence>>;
}

/// `git grep -n -w` backend. Exit code 1 means no matches, not an error.
pub struct GitGrepSearch;

impl XrefSearch for GitGrepSearch {
    fn find_occurrences(&self, identifier: &str, root: &Path) -> anyhow::Result<Vec<Occurrence>> {
        let output = Command::new("git")
            .args(["grep", "-n", "-w", identifier])
            .current_dir(root)
            .output()
            .context("failed to run git grep")?;

        if !output.status.success() {
            if output.status.code() == Some(1) && output.stdout.is_empty() {
                return Ok(Vec::new());
            }
            anyhow::bail!(
                "git grep failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(parse_grep_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Walkdir fallback for plain directories. Skips the usual noise dirs.
pub struct ScanSearch;

const SKIP_DIRS: &[&str] = &[".git", "node_modules", "target", "__pycache__", "dist", "build"];

impl XrefSearch for ScanSearch {
    fn find_occurrences(&self, identifier: &str, root: &Path) -> anyhow::Result<Vec<Occurrence>> {
        let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(identifier)))
            .context("invalid identifier pattern")?;

        let mut occurrences = Vec::new();
        let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
            e.file_name()
                .to_str()
                .map(|name| !SKIP_DIRS.contains(&name))
                .unwrap_or(true)
        });

        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(entry.path()) else {
                continue;
            };
            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .to_string();
            for (idx, line) in content.lines().enumerate() {
                if pattern.is_match(line) {
                    occurrences.push(Occurrence {
                        file_path: rel.clone(),
                        line_number: idx + 1,
                    });
                }
            }
        }
        Ok(occurrences)
    }
}

/// Parse `git grep -n` output lines (`path:line:content`).
fn parse_grep_output(output: &str) -> Vec<Occurrence> {
    output
        .lines()
        .filter_map(|line| {
            let (path, rest) = line.split_once(':')?;
            let (number, _) = rest.split_once(':')?;
            Some(Occurrence {
                file_path: path.to_string(),
                line_number: number.parse().ok()?,
            })
        })
        .collect()
}
