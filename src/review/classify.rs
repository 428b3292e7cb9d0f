//! Terminal-response classification
//!
//! A model's final answer is accepted in exactly three shapes, tried in
//! order: the literal token `APPROVED`, a direct JSON array of issues, or a
//! JSON array recovered from surrounding prose (fenced code block first,
//! then a bracket scan). Anything else is a format violation, never an
//! empty review.

use super::error::ReviewError;
use super::{Issue, RESPONSE_EXCERPT_CHARS};
use crate::llm::truncate_str;

/// Classify a terminal model reply into a list of issues.
///
/// An empty array is a valid "no issues" outcome and is distinct from a
/// format violation.
pub fn classify_response(raw: &str) -> Result<Vec<Issue>, ReviewError> {
    let trimmed = raw.trim();

    if trimmed == "APPROVED" {
        return Ok(Vec::new());
    }

    if let Ok(issues) = serde_json::from_str::<Vec<Issue>>(trimmed) {
        return Ok(issues);
    }

    if let Some(block) = fenced_block(trimmed) {
        if let Ok(issues) = serde_json::from_str::<Vec<Issue>>(block.trim()) {
            return Ok(issues);
        }
    }

    if let Some(candidate) = bracketed_array(trimmed) {
        if let Ok(issues) = serde_json::from_str::<Vec<Issue>>(candidate) {
            return Ok(issues);
        }
    }

    Err(ReviewError::FormatViolation {
        reason: "response does not match expected format".to_string(),
        response: excerpt(trimmed),
    })
}

fn excerpt(text: &str) -> String {
    let cut = truncate_str(text, RESPONSE_EXCERPT_CHARS);
    if cut.len() < text.len() {
        format!("{}...", cut)
    } else {
        cut.to_string()
    }
}

/// Extract the body of the first fenced code block, tolerating a language
/// tag on the opening fence.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

/// Find the first `[` and its matching `]` by bracket-depth counting.
/// Brackets inside JSON string literals are not recognized, so a
/// description containing an unbalanced bracket can defeat the scan; the
/// parse attempt on the result simply fails and the caller reports a
/// format violation.
fn bracketed_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::Severity;

    const ONE_ISSUE: &str = r#"[{"severity": "WARNING", "file_path": "src/lib.rs", "start_line": 4, "end_line": 6, "description": "missing bounds check"}]"#;

    #[test]
    fn test_approved_token_means_no_issues() {
        assert!(classify_response("APPROVED").unwrap().is_empty());
        assert!(classify_response("  APPROVED\n").unwrap().is_empty());
    }

    #[test]
    fn test_approved_with_trailing_prose_is_a_violation() {
        let err = classify_response("APPROVED, looks good to me").unwrap_err();
        assert!(err.is_format_violation());
    }

    #[test]
    fn test_direct_array_parsed() {
        let issues = classify_response(ONE_ISSUE).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].file_path, "src/lib.rs");
        assert_eq!(issues[0].start_line, 4);
    }

    #[test]
    fn test_empty_array_is_valid_no_issues() {
        assert!(classify_response("[]").unwrap().is_empty());
    }

    #[test]
    fn test_fenced_block_recovered() {
        let raw = format!("Here is my review:\n```json\n{}\n```\nDone.", ONE_ISSUE);
        let issues = classify_response(&raw).unwrap();
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_bare_fence_recovered() {
        let raw = format!("```\n{}\n```", ONE_ISSUE);
        assert_eq!(classify_response(&raw).unwrap().len(), 1);
    }

    #[test]
    fn test_bracket_scan_recovers_embedded_array() {
        let raw = format!("After reviewing carefully I found: {} as noted.", ONE_ISSUE);
        let issues = classify_response(&raw).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].description, "missing bounds check");
    }

    #[test]
    fn test_nested_arrays_balanced_by_depth() {
        let raw = r#"prefix [{"severity": "MINOR", "file_path": "a.rs", "start_line": 1, "end_line": 1, "description": "see [1] and [2]"}] suffix"#;
        // The citation brackets sit outside string-literal awareness but
        // still balance, so the scan lands on the right closing bracket.
        let issues = classify_response(raw).unwrap();
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_prose_is_a_format_violation_not_empty() {
        let err = classify_response("The code looks mostly fine to me.").unwrap_err();
        match err {
            ReviewError::FormatViolation { reason, response } => {
                assert_eq!(reason, "response does not match expected format");
                assert!(response.contains("mostly fine"));
            }
            other => panic!("expected format violation, got {:?}", other),
        }
    }

    #[test]
    fn test_violation_excerpt_truncated() {
        let long = "x".repeat(2000);
        match classify_response(&long).unwrap_err() {
            ReviewError::FormatViolation { response, .. } => {
                assert_eq!(response.len(), RESPONSE_EXCERPT_CHARS + 3);
                assert!(response.ends_with("..."));
            }
            other => panic!("expected format violation, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_array_is_a_violation() {
        let err = classify_response("[{\"severity\": \"MINOR\"").unwrap_err();
        assert!(err.is_format_violation());
    }
}
