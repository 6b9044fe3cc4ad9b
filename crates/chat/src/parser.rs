//! Response parsing and coercion.
//!
//! The backend's output carries no structural guarantee: it may be pure
//! JSON, JSON wrapped in prose, or no JSON at all. `parse_reply` is total —
//! every input maps to a well-formed [`ChatResponse`], trading strict
//! validation for availability. Malformed output is degradation, not an
//! error.

use serde_json::{Map, Value};

use vitrine_core::chat::{ChatResponse, Citation};

/// Fixed answer used when the backend produced nothing usable.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I was unable to generate a response. Please try again.";

/// The outcome of coercing raw backend text.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A JSON object was found and coerced field by field.
    Parsed(ChatResponse),
    /// No usable JSON: the raw text (or the fixed apology) became the answer.
    Degraded(ChatResponse),
}

impl ParseOutcome {
    pub fn into_response(self) -> ChatResponse {
        match self {
            ParseOutcome::Parsed(response) | ParseOutcome::Degraded(response) => response,
        }
    }

    pub fn response(&self) -> &ChatResponse {
        match self {
            ParseOutcome::Parsed(response) | ParseOutcome::Degraded(response) => response,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ParseOutcome::Degraded(_))
    }
}

/// Coerce raw backend text into the response contract. Never fails.
pub fn parse_reply(raw: &str) -> ParseOutcome {
    if let Some(slice) = extract_object(raw) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(slice) {
            return ParseOutcome::Parsed(coerce(&map));
        }
    }

    let answer = if raw.trim().is_empty() {
        FALLBACK_ANSWER.to_string()
    } else {
        raw.to_string()
    };
    ParseOutcome::Degraded(ChatResponse {
        answer,
        citations: Vec::new(),
        refused: false,
    })
}

/// Slice from the first `{` to the last `}`, if both exist in order.
fn extract_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Field-by-field coercion of a parsed JSON object.
fn coerce(map: &Map<String, Value>) -> ChatResponse {
    let answer = match map.get("answer") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => FALLBACK_ANSWER.to_string(),
    };

    let citations = match map.get("citations") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value::<Citation>(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    };

    let refused = map.get("refused").map(truthy).unwrap_or(false);

    ChatResponse {
        answer,
        citations,
        refused,
    }
}

/// JSON truthiness: false, null, 0, and "" are false; everything else true.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_json_parses() {
        let outcome = parse_reply(r#"{"answer":"X","citations":[],"refused":false}"#);
        assert!(!outcome.is_degraded());
        let response = outcome.into_response();
        assert_eq!(response.answer, "X");
        assert!(response.citations.is_empty());
        assert!(!response.refused);
    }

    #[test]
    fn json_embedded_in_prose_parses() {
        let outcome =
            parse_reply(r#"blah blah {"answer":"X","citations":[],"refused":false} trailing"#);
        assert_eq!(
            outcome.into_response(),
            ChatResponse {
                answer: "X".into(),
                citations: Vec::new(),
                refused: false,
            }
        );
    }

    #[test]
    fn no_braces_degrades_to_raw_text() {
        let outcome = parse_reply("I cannot help.");
        assert!(outcome.is_degraded());
        let response = outcome.into_response();
        assert_eq!(response.answer, "I cannot help.");
        assert!(response.citations.is_empty());
        assert!(!response.refused);
    }

    #[test]
    fn blank_input_degrades_to_fallback() {
        let response = parse_reply("   ").into_response();
        assert_eq!(response.answer, FALLBACK_ANSWER);

        let response = parse_reply("").into_response();
        assert_eq!(response.answer, FALLBACK_ANSWER);
    }

    #[test]
    fn reversed_braces_degrade() {
        let outcome = parse_reply("} not json {");
        assert!(outcome.is_degraded());
        assert_eq!(outcome.response().answer, "} not json {");
    }

    #[test]
    fn invalid_json_between_braces_degrades() {
        let outcome = parse_reply("{definitely not json}");
        assert!(outcome.is_degraded());
        assert_eq!(outcome.response().answer, "{definitely not json}");
    }

    #[test]
    fn json_array_is_not_an_object() {
        let outcome = parse_reply(r#"[{"answer":"X"}]"#);
        // First '{' to last '}' slices the inner object, which parses.
        assert_eq!(outcome.response().answer, "X");
    }

    #[test]
    fn empty_answer_coerces_to_fallback() {
        let response = parse_reply(r#"{"answer":"","refused":false}"#).into_response();
        assert_eq!(response.answer, FALLBACK_ANSWER);
    }

    #[test]
    fn non_string_answer_coerces_to_fallback() {
        let response = parse_reply(r#"{"answer":42}"#).into_response();
        assert_eq!(response.answer, FALLBACK_ANSWER);
    }

    #[test]
    fn citations_parse_when_well_formed() {
        let response = parse_reply(
            r#"{"answer":"X","citations":[{"sourceId":"rarity.txt","quote":"Rarity is determined by print run."}],"refused":false}"#,
        )
        .into_response();
        assert_eq!(response.citations.len(), 1);
        assert_eq!(response.citations[0].source_id, "rarity.txt");
        assert_eq!(
            response.citations[0].quote,
            "Rarity is determined by print run."
        );
    }

    #[test]
    fn malformed_citation_items_are_dropped() {
        let response = parse_reply(
            r#"{"answer":"X","citations":[{"sourceId":"a.txt","quote":"ok"},{"sourceId":7},"bare"]}"#,
        )
        .into_response();
        assert_eq!(response.citations.len(), 1);
        assert_eq!(response.citations[0].source_id, "a.txt");
    }

    #[test]
    fn non_array_citations_coerce_to_empty() {
        let response = parse_reply(r#"{"answer":"X","citations":"none"}"#).into_response();
        assert!(response.citations.is_empty());
    }

    #[test]
    fn refused_follows_truthiness() {
        assert!(parse_reply(r#"{"answer":"X","refused":true}"#).response().refused);
        assert!(parse_reply(r#"{"answer":"X","refused":1}"#).response().refused);
        assert!(parse_reply(r#"{"answer":"X","refused":"yes"}"#).response().refused);
        assert!(!parse_reply(r#"{"answer":"X","refused":0}"#).response().refused);
        assert!(!parse_reply(r#"{"answer":"X","refused":""}"#).response().refused);
        assert!(!parse_reply(r#"{"answer":"X","refused":null}"#).response().refused);
        assert!(!parse_reply(r#"{"answer":"X"}"#).response().refused);
    }

    #[test]
    fn never_panics_on_junk() {
        for junk in ["{", "}", "{}", "{{{}}}", "\u{0}{\"answer\"", "🦀", "{\"answer\": }"] {
            let _ = parse_reply(junk);
        }
    }

    #[test]
    fn empty_object_gets_full_defaults() {
        let response = parse_reply("{}").into_response();
        assert_eq!(response.answer, FALLBACK_ANSWER);
        assert!(response.citations.is_empty());
        assert!(!response.refused);
    }
}
