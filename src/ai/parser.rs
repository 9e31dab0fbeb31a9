//! Model Response Parsing
//!
//! Model output is expected to be JSON but arrives wrapped in markdown fences
//! or cut off mid-document when the output token limit is hit. Parsing runs in
//! two passes:
//!
//! 1. Strip code fences, parse directly.
//! 2. On failure, scan the text with [`ScanState`], close an open string and
//!    balance leftover brackets/braces, then parse again.
//!
//! If the repaired text still fails, the error from the first pass is returned
//! so callers see the root cause rather than an artifact of the repair.
//!
//! The mid-value check used when closing an open string compares the last
//! colon and the last comma before the final quote. It is an approximation
//! and can misjudge truncation inside nested objects or arrays.

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::types::{BugsightError, Result};

const FENCE: &str = "```";
const TRUNCATION_MARKER: &str = "...";

// =============================================================================
// Scanner
// =============================================================================

/// Lexical state while walking JSON text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Outside any string literal
    #[default]
    Normal,
    /// Inside a string literal
    InString,
    /// Inside a string literal, directly after a backslash
    Escaped,
}

impl ScanState {
    /// Transition on one character
    pub fn next(self, ch: char) -> Self {
        match (self, ch) {
            (Self::Normal, '"') => Self::InString,
            (Self::Normal, _) => Self::Normal,
            (Self::InString, '\\') => Self::Escaped,
            (Self::InString, '"') => Self::Normal,
            (Self::InString, _) => Self::InString,
            (Self::Escaped, _) => Self::InString,
        }
    }

    pub fn in_string(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// Result of a full left-to-right scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanSummary {
    pub state: ScanState,
    pub brace_depth: i64,
    pub bracket_depth: i64,
}

/// Walk `text`, counting structural characters outside string literals
pub fn scan(text: &str) -> ScanSummary {
    let mut summary = ScanSummary::default();

    for ch in text.chars() {
        if summary.state == ScanState::Normal {
            match ch {
                '{' => summary.brace_depth += 1,
                '}' => summary.brace_depth -= 1,
                '[' => summary.bracket_depth += 1,
                ']' => summary.bracket_depth -= 1,
                _ => {}
            }
        }
        summary.state = summary.state.next(ch);
    }

    summary
}

// =============================================================================
// Parser
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse model output into `T`, repairing truncated JSON when needed
    #[instrument(skip_all, fields(len = text.len()))]
    pub fn parse<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        let cleaned = strip_fences(text);

        let original = match serde_json::from_str::<T>(cleaned) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        debug!(error = %original, "Direct parse failed, attempting repair");
        let repaired = repair(cleaned);

        match serde_json::from_str::<T>(&repaired) {
            Ok(value) => {
                warn!(
                    added = repaired.len().saturating_sub(cleaned.len()),
                    "Model response was truncated, parsed after repair"
                );
                Ok(value)
            }
            Err(repair_error) => {
                debug!(error = %repair_error, "Repaired response still invalid");
                Err(BugsightError::ResponseParse(original))
            }
        }
    }
}

/// Remove a leading fence (with or without language tag) and a trailing fence
pub fn strip_fences(text: &str) -> &str {
    let mut s = text.trim();

    if let Some(rest) = s.strip_prefix(FENCE) {
        // A tag is a token followed by whitespace (newline or same-line body)
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len());
        let after_tag = &rest[tag_len..];
        let is_tag =
            tag_len > 0 && (after_tag.is_empty() || after_tag.starts_with(char::is_whitespace));
        s = if is_tag { after_tag } else { rest };
    }

    if let Some(rest) = s.strip_suffix(FENCE) {
        s = rest;
    }

    s.trim()
}

/// Close an open string and balance brackets so truncated JSON can parse
#[instrument(level = "debug", skip_all)]
pub fn repair(text: &str) -> String {
    let summary = scan(text);
    let mut repaired = text.to_string();

    if summary.state.in_string() {
        match text.rfind('"') {
            Some(quote) => {
                let before = &text[..quote];
                // Option ordering: a colon with no comma at all counts as more recent
                let mid_value = before.rfind(':') > before.rfind(',');
                if mid_value {
                    repaired.truncate(quote + 1);
                    repaired.push_str(TRUNCATION_MARKER);
                    repaired.push('"');
                } else {
                    repaired.push('"');
                }
            }
            None => repaired.push('"'),
        }
    }

    for _ in 0..summary.bracket_depth.max(0) {
        repaired.push(']');
    }
    for _ in 0..summary.brace_depth.max(0) {
        repaired.push('}');
    }

    debug!(
        in_string = summary.state.in_string(),
        brackets = summary.bracket_depth,
        braces = summary.brace_depth,
        "Repair applied"
    );
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::{Value, json};

    // -------------------------------------------------------------------------
    // Scanner transitions
    // -------------------------------------------------------------------------

    #[test]
    fn test_normal_transitions() {
        assert_eq!(ScanState::Normal.next('"'), ScanState::InString);
        assert_eq!(ScanState::Normal.next('\\'), ScanState::Normal);
        assert_eq!(ScanState::Normal.next('{'), ScanState::Normal);
    }

    #[test]
    fn test_in_string_transitions() {
        assert_eq!(ScanState::InString.next('"'), ScanState::Normal);
        assert_eq!(ScanState::InString.next('\\'), ScanState::Escaped);
        assert_eq!(ScanState::InString.next('{'), ScanState::InString);
    }

    #[test]
    fn test_escaped_transitions() {
        assert_eq!(ScanState::Escaped.next('"'), ScanState::InString);
        assert_eq!(ScanState::Escaped.next('\\'), ScanState::InString);
        assert_eq!(ScanState::Escaped.next('n'), ScanState::InString);
    }

    #[test]
    fn test_scan_ignores_structure_inside_strings() {
        let summary = scan(r#"{"a": "{[\"", "b": [1"#);
        assert_eq!(summary.state, ScanState::Normal);
        assert_eq!(summary.brace_depth, 1);
        assert_eq!(summary.bracket_depth, 1);
    }

    #[test]
    fn test_scan_ends_escaped() {
        let summary = scan(r#"{"a": "x\"#);
        assert_eq!(summary.state, ScanState::Escaped);
        assert_eq!(summary.brace_depth, 1);
    }

    // -------------------------------------------------------------------------
    // Fences
    // -------------------------------------------------------------------------

    #[test]
    fn test_strip_fences_variants() {
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("  ```\n[1]\n```  "), "[1]");
        assert_eq!(strip_fences("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_fences("```json\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_fences("```json-5\r\n[2]\r\n```"), "[2]");
    }

    #[test]
    fn test_strip_fences_tag_on_body_line() {
        assert_eq!(strip_fences("```json {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_fences("```JSON\t[1, 2]\n```"), "[1, 2]");
        // a bare scalar body is not mistaken for a tag
        assert_eq!(strip_fences("```42```"), "42");

        let value: serde_json::Value = ResponseParser::new()
            .parse("```json {\"summary\": \"s\"}```")
            .unwrap();
        assert_eq!(value["summary"], "s");
    }

    // -------------------------------------------------------------------------
    // Repair
    // -------------------------------------------------------------------------

    #[test]
    fn test_repair_open_string_mid_value() {
        let parsed: Value = ResponseParser::new().parse(r#"{"a": "open value"#).unwrap();
        let value = parsed["a"].as_str().unwrap();
        assert!(value.ends_with("..."));
    }

    #[test]
    fn test_repair_balances_array_then_object() {
        assert_eq!(repair(r#"{"a":[1,2,3"#), r#"{"a":[1,2,3]}"#);

        let parsed: Value = ResponseParser::new().parse(r#"{"a":[1,2,3"#).unwrap();
        assert_eq!(parsed, json!({"a": [1, 2, 3]}));
    }

    #[test]
    fn test_repair_open_string_in_array() {
        let parsed: Value = ResponseParser::new()
            .parse(r#"{"steps": ["one", "tw"#)
            .unwrap();
        assert_eq!(parsed, json!({"steps": ["one", "tw"]}));
    }

    #[test]
    fn test_repair_ignores_negative_depth() {
        assert_eq!(repair("[1]]"), "[1]]");
    }

    #[test]
    fn test_failed_repair_returns_original_error() {
        let input = r#"{"a": [1, 2,"#;
        let original = serde_json::from_str::<Value>(input).unwrap_err().to_string();

        let err = ResponseParser::new().parse::<Value>(input).unwrap_err();
        match err {
            BugsightError::ResponseParse(e) => assert_eq!(e.to_string(), original),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_nested_key_truncation_is_not_recovered() {
        // open key inside a nested object: closing quote alone leaves a key without value
        let result = ResponseParser::new().parse::<Value>(r#"{"a": {"b": 1, "c"#);
        assert!(matches!(result, Err(BugsightError::ResponseParse(_))));
    }

    #[test]
    fn test_shape_mismatch_is_parse_error() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Shape {
            summary: String,
        }
        let result = ResponseParser::new().parse::<Shape>(r#"{"other": 1}"#);
        assert!(matches!(result, Err(BugsightError::ResponseParse(_))));
    }

    // -------------------------------------------------------------------------
    // Fenced round trip
    // -------------------------------------------------------------------------

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            ".*".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 48, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-zA-Z_]{1,8}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_fenced_json_round_trips(value in arb_json()) {
            let text = format!("```json\n{}\n```", serde_json::to_string(&value).unwrap());
            let parsed: Value = ResponseParser::new().parse(&text).unwrap();
            prop_assert_eq!(parsed, value);
        }
    }
}
