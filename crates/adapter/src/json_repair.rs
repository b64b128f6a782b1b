//! Best-effort recovery of malformed JSON text.
//!
//! Streamed tool-call arguments regularly arrive truncated: an unterminated
//! string, missing closing brackets, a comma with nothing after it. A strict
//! parse is attempted first; only on failure does a single recovery pass run,
//! which tracks string literals and open brackets and appends whatever is
//! needed to close the document, then strict-parses the result.

use serde_json::Value;

use crate::error::LlmError;

/// Parse `raw` into a structured value, repairing it if necessary.
///
/// Fails with [`LlmError::ArgumentParse`] when recovery still does not yield
/// a value; the failure is logged with the offending raw text because
/// unparsable tool arguments make the whole call unusable.
pub(crate) fn repair(raw: &str) -> crate::Result<Value> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Ok(value);
    }

    let recovered = recover(raw);

    serde_json::from_str(&recovered).map_err(|parse_error| {
        log::warn!("tool-call arguments unrecoverable after repair ({parse_error}): {raw}");
        LlmError::ArgumentParse { raw: raw.to_string() }
    })
}

/// Close whatever the input left open.
///
/// Handles unterminated strings (including a dangling escape), unclosed
/// objects and arrays, trailing commas before a closing bracket or at
/// end-of-input, and a key left dangling at a colon.
fn recover(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in raw.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' => {
                closers.push('}');
                out.push(c);
            }
            '[' => {
                closers.push(']');
                out.push(c);
            }
            '}' | ']' => {
                if closers.last() == Some(&c) {
                    closers.pop();
                }
                trim_trailing_comma(&mut out);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    if in_string {
        if escaped {
            // A lone trailing backslash would escape the quote we add.
            out.pop();
        }
        out.push('"');
    }

    trim_trailing_comma(&mut out);

    if out.ends_with(':') {
        out.push_str("null");
    }

    for closer in closers.into_iter().rev() {
        out.push(closer);
    }

    out
}

fn trim_trailing_comma(out: &mut String) {
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    if out.ends_with(',') {
        out.pop();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn valid_json_passes_through() {
        assert_eq!(repair(r#"{"q":"x"}"#).unwrap(), json!({"q": "x"}));
        assert_eq!(repair("[1, 2, 3]").unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn missing_closing_brackets_are_appended() {
        assert_eq!(repair(r#"{"a": {"b": [1, 2"#).unwrap(), json!({"a": {"b": [1, 2]}}));
    }

    #[test]
    fn unterminated_string_is_closed() {
        assert_eq!(repair(r#"{"city": "Par"#).unwrap(), json!({"city": "Par"}));
    }

    #[test]
    fn dangling_escape_is_dropped() {
        assert_eq!(repair(r#"{"path": "C:\"#).unwrap(), json!({"path": "C:"}));
    }

    #[test]
    fn trailing_commas_are_tolerated() {
        assert_eq!(repair(r#"{"a": 1,}"#).unwrap(), json!({"a": 1}));
        assert_eq!(repair(r#"{"a": 1,"#).unwrap(), json!({"a": 1}));
        assert_eq!(repair("[1, 2,]").unwrap(), json!([1, 2]));
    }

    #[test]
    fn dangling_key_becomes_null() {
        assert_eq!(repair(r#"{"a":"#).unwrap(), json!({"a": null}));
    }

    #[test]
    fn brackets_inside_strings_are_not_structure() {
        assert_eq!(repair(r#"{"expr": "a[0] + {b}"#).unwrap(), json!({"expr": "a[0] + {b}"}));
    }

    #[test]
    fn repair_is_idempotent_on_its_own_output() {
        let first = repair(r#"{"q": "x", "n": [1,"#).unwrap();
        let serialized = serde_json::to_string(&first).unwrap();
        assert_eq!(repair(&serialized).unwrap(), first);
    }

    #[test]
    fn unrecoverable_input_reports_the_raw_text() {
        let error = repair("not json at all").unwrap_err();
        assert!(matches!(error, LlmError::ArgumentParse { ref raw } if raw == "not json at all"));
    }
}
