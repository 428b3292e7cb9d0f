//! Unified diff parsing
//!
//! Turns raw `git diff` output into exact changed-line positions in the new
//! file's coordinate space. Only lines that were actually added or replaced
//! are reported, never the whole hunk window: a large hunk with one real
//! edit must not drag every symbol spanning it into the review context.

use regex::Regex;
use std::collections::{BTreeSet, HashMap};

/// A contiguous run of changed lines, 1-based in the new file's numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub count: usize,
}

impl LineRange {
    pub fn end(&self) -> usize {
        self.start + self.count - 1
    }
}

/// Parse a unified diff into per-file changed-line ranges.
///
/// Hunk headers that fail to parse are skipped silently; the body of a
/// skipped hunk contributes nothing. An empty diff yields an empty map.
///
/// Hunk bodies are consumed by the line counts declared in the `@@`
/// header, so body content is never mistaken for a file header: a deleted
/// `-- comment` line renders as `--- comment` in a valid diff, and a diff
/// of a patch file can add lines that themselves start with `+++`.
pub fn parse_changed_lines(diff: &str) -> HashMap<String, Vec<LineRange>> {
    let hunk_re = Regex::new(r"^@@\s+-\d+(?:,(\d+))?\s+\+(\d+)(?:,(\d+))?\s+@@").unwrap();

    let mut marks: HashMap<String, BTreeSet<usize>> = HashMap::new();
    let mut current_file: Option<String> = None;
    let mut cursor = 0usize;
    // Old/new body lines still owed to the current hunk.
    let mut remaining_old = 0usize;
    let mut remaining_new = 0usize;

    for line in diff.lines() {
        if remaining_old > 0 || remaining_new > 0 {
            let Some(file) = &current_file else {
                remaining_old = 0;
                remaining_new = 0;
                continue;
            };
            if line.starts_with('+') {
                marks.entry(file.clone()).or_default().insert(cursor);
                cursor += 1;
                remaining_new = remaining_new.saturating_sub(1);
            } else if line.starts_with('-') {
                // A deletion touches the current position in the new file
                // but does not occupy one. Re-marking the same line is
                // idempotent.
                marks.entry(file.clone()).or_default().insert(cursor);
                remaining_old = remaining_old.saturating_sub(1);
            } else if line.starts_with('\\') {
                // "\ No newline at end of file" consumes no budget.
            } else {
                // Context line (leading space, or empty when trailing
                // whitespace was stripped).
                cursor += 1;
                remaining_old = remaining_old.saturating_sub(1);
                remaining_new = remaining_new.saturating_sub(1);
            }
            continue;
        }

        if let Some(path) = line.strip_prefix("+++ b/") {
            current_file = Some(path.to_string());
            continue;
        }
        if line.starts_with("@@") && current_file.is_some() {
            if let Some(caps) = hunk_re.captures(line) {
                let old_count = caps.get(1).map_or(Some(1), |m| m.as_str().parse().ok());
                let new_start = caps[2].parse::<usize>().ok();
                let new_count = caps.get(3).map_or(Some(1), |m| m.as_str().parse().ok());
                if let (Some(old), Some(start), Some(new)) = (old_count, new_start, new_count) {
                    cursor = start;
                    remaining_old = old;
                    remaining_new = new;
                }
            }
            // A malformed header leaves both counts at zero, so the body
            // that follows is ignored.
            continue;
        }
        // Between hunks everything else (diff/index/mode/--- headers) is
        // noise.
    }

    marks
        .into_iter()
        .map(|(file, lines)| (file, collapse_into_ranges(&lines)))
        .collect()
}

/// Collapse a sorted set of line numbers into contiguous ranges.
fn collapse_into_ranges(lines: &BTreeSet<usize>) -> Vec<LineRange> {
    let mut ranges: Vec<LineRange> = Vec::new();
    for &line in lines {
        match ranges.last_mut() {
            Some(last) if last.start + last.count == line => last.count += 1,
            _ => ranges.push(LineRange { start: line, count: 1 }),
        }
    }
    ranges
}

/// Returns true if any changed line falls inside `[start_line, end_line]`,
/// boundaries inclusive.
pub fn ranges_intersect(ranges: &[LineRange], start_line: usize, end_line: usize) -> bool {
    ranges
        .iter()
        .any(|r| r.start <= end_line && start_line <= r.end())
}

/// Split a multi-file diff into per-file segments keyed by new-file path.
///
/// Each segment keeps its `diff --git` header so the prompt shows the model
/// exactly what git produced. Segments without a `+++ b/` line (e.g. pure
/// deletions ending in `/dev/null`) are dropped.
pub fn split_diff_by_file(diff: &str) -> HashMap<String, String> {
    let mut segments = HashMap::new();
    let mut current: Vec<&str> = Vec::new();

    let flush = |lines: &[&str], segments: &mut HashMap<String, String>| {
        let path = lines
            .iter()
            .find_map(|l| l.strip_prefix("+++ b/"))
            .map(str::to_string);
        if let Some(path) = path {
            let mut text = lines.join("\n");
            text.push('\n');
            segments.insert(path, text);
        }
    };

    for line in diff.lines() {
        if line.starts_with("diff --git") && !current.is_empty() {
            flush(&current, &mut segments);
            current.clear();
        }
        current.push(line);
    }
    if !current.is_empty() {
        flush(&current, &mut segments);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_of(ranges: &[LineRange]) -> Vec<usize> {
        ranges
            .iter()
            .flat_map(|r| r.start..=r.end())
            .collect()
    }

    #[test]
    fn test_single_replacement_marks_exact_line() {
        // Five-line window, only line 12 replaced.
        let diff = "\
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -10,5 +10,5 @@
 line ten
 line eleven
-old twelve
+new twelve
 line thirteen
 line fourteen
";
        let changed = parse_changed_lines(diff);
        let ranges = &changed["src/lib.rs"];
        assert_eq!(ranges, &vec![LineRange { start: 12, count: 1 }]);
    }

    #[test]
    fn test_two_hunks_stay_separate() {
        let diff = "\
--- a/main.go
+++ b/main.go
@@ -1,2 +1,3 @@
 ctx
+line1
 ctx
@@ -10,3 +11,4 @@
 ctx
+line2
 ctx
 ctx
";
        let changed = parse_changed_lines(diff);
        let ranges = &changed["main.go"];
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0], LineRange { start: 2, count: 1 });
        assert_eq!(ranges[1], LineRange { start: 12, count: 1 });
    }

    #[test]
    fn test_changed_lines_stay_within_hunk_window() {
        let diff = "\
+++ b/a.rs
@@ -3,4 +3,4 @@
 ctx
-gone
+here
 ctx
 ctx
";
        let changed = parse_changed_lines(diff);
        for line in lines_of(&changed["a.rs"]) {
            assert!((3..=6).contains(&line), "line {} outside window", line);
        }
    }

    #[test]
    fn test_consecutive_additions_merge() {
        let diff = "\
+++ b/a.rs
@@ -1,1 +1,3 @@
 ctx
+two
+three
";
        let changed = parse_changed_lines(diff);
        assert_eq!(changed["a.rs"], vec![LineRange { start: 2, count: 2 }]);
    }

    #[test]
    fn test_adjacent_deletions_mark_one_line_once() {
        // Both deletions sit at new-file position 2; the mark is idempotent.
        let diff = "\
+++ b/a.rs
@@ -1,3 +1,1 @@
 ctx
-gone one
-gone two
";
        let changed = parse_changed_lines(diff);
        assert_eq!(changed["a.rs"], vec![LineRange { start: 2, count: 1 }]);
    }

    #[test]
    fn test_malformed_hunk_header_skipped() {
        let diff = "\
+++ b/a.rs
@@ -x,1 +y,1 @@
+should not count
@@ -5,1 +5,1 @@
-old
+new
";
        let changed = parse_changed_lines(diff);
        assert_eq!(changed["a.rs"], vec![LineRange { start: 5, count: 1 }]);
    }

    #[test]
    fn test_empty_diff_yields_empty_map() {
        assert!(parse_changed_lines("").is_empty());
    }

    #[test]
    fn test_deleted_dash_comment_is_body_not_a_boundary() {
        // Deleting the SQL comment "-- old comment" renders as
        // "--- old comment" inside the hunk body.
        let diff = "\
+++ b/schema.sql
@@ -1,4 +1,2 @@
 CREATE TABLE t (id INT);
--- old comment
-DROP TABLE t;
 SELECT 1;
";
        let changed = parse_changed_lines(diff);
        assert_eq!(changed["schema.sql"], vec![LineRange { start: 2, count: 1 }]);
    }

    #[test]
    fn test_added_plus_prefixed_line_is_body_not_a_boundary() {
        // A diff of a patch file can add a line whose content is
        // "++ extra", which renders as "+++ extra" in the body.
        let diff = "\
+++ b/notes.patch
@@ -1,1 +1,2 @@
 ctx
+++ extra
@@ -5,1 +5,2 @@
 ctx
+later
";
        let changed = parse_changed_lines(diff);
        assert_eq!(
            changed["notes.patch"],
            vec![LineRange { start: 2, count: 1 }, LineRange { start: 6, count: 1 }]
        );
        assert_eq!(changed.len(), 1);
    }

    #[test]
    fn test_no_newline_marker_consumes_no_budget() {
        let diff = "\
+++ b/a.txt
@@ -1,1 +1,1 @@
-old
\\ No newline at end of file
+new
\\ No newline at end of file
";
        let changed = parse_changed_lines(diff);
        assert_eq!(changed["a.txt"], vec![LineRange { start: 1, count: 1 }]);
    }

    #[test]
    fn test_multiple_files_tracked_separately() {
        let diff = "\
diff --git a/one.rs b/one.rs
--- a/one.rs
+++ b/one.rs
@@ -1,1 +1,2 @@
 ctx
+added
diff --git a/two.rs b/two.rs
--- a/two.rs
+++ b/two.rs
@@ -7,1 +7,2 @@
 ctx
+added
";
        let changed = parse_changed_lines(diff);
        assert_eq!(changed["one.rs"], vec![LineRange { start: 2, count: 1 }]);
        assert_eq!(changed["two.rs"], vec![LineRange { start: 8, count: 1 }]);
    }

    #[test]
    fn test_boundary_intersection() {
        let ranges = vec![LineRange { start: 5, count: 1 }];
        assert!(ranges_intersect(&ranges, 5, 10));
        assert!(ranges_intersect(&ranges, 1, 5));
        assert!(!ranges_intersect(&ranges, 6, 10));
        let ranges = vec![LineRange { start: 10, count: 1 }];
        assert!(ranges_intersect(&ranges, 5, 10));
        assert!(!ranges_intersect(&ranges, 5, 9));
        assert!(!ranges_intersect(&ranges, 11, 20));
    }

    #[test]
    fn test_split_diff_by_file() {
        let diff = "\
diff --git a/one.rs b/one.rs
--- a/one.rs
+++ b/one.rs
@@ -1,1 +1,2 @@
 ctx
+added
diff --git a/two.rs b/two.rs
--- a/two.rs
+++ b/two.rs
@@ -7,1 +7,2 @@
 ctx
+added
";
        let segments = split_diff_by_file(diff);
        assert_eq!(segments.len(), 2);
        assert!(segments["one.rs"].contains("diff --git a/one.rs"));
        assert!(segments["one.rs"].contains("@@ -1,1 +1,2 @@"));
        assert!(!segments["one.rs"].contains("two.rs"));
        assert!(segments["two.rs"].contains("@@ -7,1 +7,2 @@"));
    }

    #[test]
    fn test_pure_deletion_segment_dropped() {
        let diff = "\
diff --git a/gone.rs b/gone.rs
--- a/gone.rs
+++ /dev/null
@@ -1,2 +0,0 @@
-all
-gone
";
        assert!(split_diff_by_file(diff).is_empty());
    }
}
