//! Defensive JSON extraction for completion-service output.
//!
//! Models wrap JSON in markdown fences, prepend prose, or return nothing useful at all.
//! `extract_json` never fails: it yields `AiParse::Valid` with the first parseable JSON
//! array or object it can find, or `AiParse::Fallback` with a neutral default object.
//! Typed validators then read fields through the coercion helpers below rather than
//! trusting any shape.

use serde_json::{json, Value};

/// Outcome of parsing untrusted model output. Both variants carry a usable value;
/// `Fallback` means the value is the documented default rather than model output.
#[derive(Debug, Clone, PartialEq)]
pub enum AiParse<T> {
    Valid(T),
    Fallback(T),
}

impl<T> AiParse<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, AiParse::Fallback(_))
    }

    pub fn value(&self) -> &T {
        match self {
            AiParse::Valid(v) | AiParse::Fallback(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            AiParse::Valid(v) | AiParse::Fallback(v) => v,
        }
    }
}

/// Returned whenever no JSON can be recovered from a completion.
pub fn fallback_value() -> Value {
    json!({
        "mustHaveKeywords": [],
        "successProbability": { "overallProbability": 50 },
        "overallProbability": 50
    })
}

/// Which JSON container the caller expects at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    /// Prefer the first parseable array; accept an object only if no array parses.
    Array,
    /// The earliest array or object that parses.
    Any,
}

/// Recovers a JSON array or object from `content`.
///
/// The body of the first markdown code fence is tried before the full text. With
/// `JsonShape::Array` every candidate is searched for an array before any object is
/// considered, so an array wrapped in an object is still found. With `JsonShape::Any`
/// the earliest `[` or `{` whose bracket-balanced slice parses wins.
pub fn extract_json(content: &str, shape: JsonShape) -> AiParse<Value> {
    let fenced = fenced_body(content);
    let candidates: Vec<&str> = fenced.into_iter().chain(std::iter::once(content)).collect();

    let arrays = || {
        candidates
            .iter()
            .find_map(|text| first_json_value(text, &['[']))
    };
    let any = || {
        candidates
            .iter()
            .find_map(|text| first_json_value(text, &['[', '{']))
    };
    let found = match shape {
        JsonShape::Array => arrays().or_else(any),
        JsonShape::Any => any(),
    };

    match found {
        Some(value) => AiParse::Valid(value),
        None => AiParse::Fallback(fallback_value()),
    }
}

fn fenced_body(content: &str) -> Option<&str> {
    let open = content.find("```")?;
    let after_ticks = &content[open + 3..];
    // Skip the info string (`json`, `JSON`, ...) up to the end of the fence line.
    let body_start = after_ticks.find('\n').map(|i| i + 1).unwrap_or(after_ticks.len());
    let body = &after_ticks[body_start..];
    Some(match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    })
}

fn first_json_value(text: &str, openers: &[char]) -> Option<Value> {
    text.char_indices()
        .filter(|(_, c)| openers.contains(c))
        .find_map(|(start, _)| {
            let end = balanced_end(text, start)?;
            serde_json::from_str::<Value>(&text[start..end]).ok()
        })
}

/// Byte offset just past the bracket that closes the one at `start`, honouring
/// string literals and escapes. `None` if brackets are mismatched or unterminated.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut expected: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' => expected.push(']'),
            '{' => expected.push('}'),
            ']' | '}' => {
                if expected.pop() != Some(c) {
                    return None;
                }
                if expected.is_empty() {
                    return Some(start + offset + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

// ────────────────────────────────────────────────────────────────────────────
// Coercion helpers
// ────────────────────────────────────────────────────────────────────────────

/// A finite number, or a string holding one (a trailing `%` is tolerated).
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            s.strip_suffix('%').unwrap_or(s).trim().parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Identifiers compare as strings: the model may echo `"42"` back as `42`.
pub fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{}", f as i64)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

/// Rounds and clamps to 0..=100.
pub fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

/// A percentage field: coerced, clamped, or `default` if absent or invalid.
pub fn percent_or(value: Option<&Value>, default: u8) -> u8 {
    value.and_then(coerce_f64).map(clamp_percent).unwrap_or(default)
}

/// Non-empty trimmed strings from an array field; a bare string becomes a one-item list.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    let items: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(v @ Value::String(_)) => vec![v],
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_fenced_object_after_prose() {
        let parsed = extract_json("Here is the result:\n```json\n{\"a\":1}\n```", JsonShape::Any);
        assert_eq!(parsed, AiParse::Valid(json!({"a": 1})));
    }

    #[test]
    fn test_unparsable_text_yields_fallback() {
        let parsed = extract_json("not json at all", JsonShape::Any);
        assert!(parsed.is_fallback());
        assert_eq!(parsed.into_inner(), fallback_value());
    }

    #[test]
    fn test_fallback_shape() {
        let fallback = fallback_value();
        assert_eq!(fallback["mustHaveKeywords"], json!([]));
        assert_eq!(fallback["successProbability"]["overallProbability"], 50);
        assert_eq!(fallback["overallProbability"], 50);
    }

    #[test]
    fn test_bare_array_with_trailing_prose() {
        let parsed = extract_json("[{\"jobId\": \"1\"}]\nLet me know if you need more.", JsonShape::Any);
        assert_eq!(parsed.into_inner(), json!([{"jobId": "1"}]));
    }

    #[test]
    fn test_enclosing_object_beats_nested_array() {
        let parsed = extract_json("Sure! {\"factors\": [\"demand\"], \"minSalary\": 90}", JsonShape::Any);
        assert_eq!(
            parsed.into_inner(),
            json!({"factors": ["demand"], "minSalary": 90})
        );
    }

    #[test]
    fn test_brackets_inside_strings_are_ignored() {
        let parsed = extract_json("{\"reason\": \"uses [brackets] and } braces\", \"n\": 2}", JsonShape::Any);
        assert_eq!(parsed.into_inner()["n"], 2);
    }

    #[test]
    fn test_array_preference_finds_wrapped_array() {
        let content = r#"{"rankings": [{"jobId": "1"}, {"jobId": "2"}]}"#;
        assert_eq!(
            extract_json(content, JsonShape::Array).into_inner(),
            json!([{"jobId": "1"}, {"jobId": "2"}])
        );
        assert!(extract_json(content, JsonShape::Any).into_inner().is_object());
    }

    #[test]
    fn test_array_preference_searches_full_text_before_objects() {
        let content = "```json\n{\"note\": \"see below\"}\n```\nRanking: [{\"jobId\": 3}]";
        assert_eq!(
            extract_json(content, JsonShape::Array).into_inner(),
            json!([{"jobId": 3}])
        );
    }

    #[test]
    fn test_array_preference_accepts_object_when_no_array() {
        let parsed = extract_json("Result: {\"jobId\": \"5\"}", JsonShape::Array);
        assert_eq!(parsed, AiParse::Valid(json!({"jobId": "5"})));
    }

    #[test]
    fn test_skips_bracketed_prose_before_json() {
        let parsed = extract_json("[note] the ranking follows:\n[{\"jobId\": 7}]", JsonShape::Any);
        assert_eq!(parsed.into_inner(), json!([{"jobId": 7}]));
    }

    #[test]
    fn test_unterminated_fence_still_parses() {
        let parsed = extract_json("```json\n[1, 2, 3]", JsonShape::Any);
        assert_eq!(parsed, AiParse::Valid(json!([1, 2, 3])));
    }

    #[test]
    fn test_truncated_json_falls_back() {
        assert!(extract_json("[{\"jobId\": \"1\", \"matchScore\": 8", JsonShape::Any).is_fallback());
        assert!(extract_json("", JsonShape::Any).is_fallback());
    }

    #[test]
    fn test_coerce_f64_variants() {
        assert_eq!(coerce_f64(&json!(72.5)), Some(72.5));
        assert_eq!(coerce_f64(&json!(" 81 ")), Some(81.0));
        assert_eq!(coerce_f64(&json!("64%")), Some(64.0));
        assert_eq!(coerce_f64(&json!("high")), None);
        assert_eq!(coerce_f64(&json!(null)), None);
        assert_eq!(coerce_f64(&json!("NaN")), None);
        assert_eq!(coerce_f64(&json!("inf")), None);
    }

    #[test]
    fn test_coerce_id_variants() {
        assert_eq!(coerce_id(&json!("job-1")), Some("job-1".to_string()));
        assert_eq!(coerce_id(&json!(42)), Some("42".to_string()));
        assert_eq!(coerce_id(&json!(42.0)), Some("42".to_string()));
        assert_eq!(coerce_id(&json!(true)), None);
    }

    #[test]
    fn test_percent_helpers() {
        assert_eq!(clamp_percent(140.0), 100);
        assert_eq!(clamp_percent(-3.0), 0);
        assert_eq!(clamp_percent(66.5), 67);
        assert_eq!(percent_or(Some(&json!("bad")), 50), 50);
        assert_eq!(percent_or(None, 50), 50);
        assert_eq!(percent_or(Some(&json!(12)), 50), 12);
    }

    #[test]
    fn test_string_list_tolerates_shapes() {
        assert_eq!(
            string_list(Some(&json!(["a", " ", 3, "b "]))),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(string_list(Some(&json!("solo"))), vec!["solo".to_string()]);
        assert!(string_list(Some(&json!({"k": 1}))).is_empty());
        assert!(string_list(None).is_empty());
    }
}
