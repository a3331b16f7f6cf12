//! Interpretation of raw completion text
//!
//! The model is asked for `{"answer": string, "serviceIds": [int, ...]}` but
//! nothing guarantees it complies. Parsing never fails: text that is not a
//! JSON object becomes a [`ParsedCompletion::Fallback`] carrying the raw text,
//! so the user always gets something readable.

use serde_json::Value;
use tracing::{debug, warn};

/// What the completion text turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCompletion {
    /// The text was a JSON object. `service_ids` are still untrusted and are
    /// validated by the resolver.
    Structured {
        answer: String,
        service_ids: Vec<Value>,
    },
    /// The text was not a JSON object and is shown verbatim
    Fallback { answer: String },
}

impl ParsedCompletion {
    pub fn answer(&self) -> &str {
        match self {
            ParsedCompletion::Structured { answer, .. } => answer,
            ParsedCompletion::Fallback { answer } => answer,
        }
    }

    /// Ids to resolve; always empty for a fallback
    pub fn service_ids(&self) -> &[Value] {
        match self {
            ParsedCompletion::Structured { service_ids, .. } => service_ids,
            ParsedCompletion::Fallback { .. } => &[],
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ParsedCompletion::Fallback { .. })
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        match self {
            ParsedCompletion::Structured {
                answer,
                service_ids,
            } => (answer, service_ids),
            ParsedCompletion::Fallback { answer } => (answer, Vec::new()),
        }
    }
}

/// Parse raw completion text
pub fn parse_completion(raw: &str) -> ParsedCompletion {
    let mut object = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        Ok(other) => {
            warn!("Completion is JSON but not an object ({}), using raw text", json_kind(&other));
            return ParsedCompletion::Fallback {
                answer: raw.to_string(),
            };
        }
        Err(e) => {
            warn!("Completion is not valid JSON ({}), using raw text", e);
            return ParsedCompletion::Fallback {
                answer: raw.to_string(),
            };
        }
    };

    let answer = match object.remove("answer") {
        Some(Value::String(answer)) if !answer.is_empty() => answer,
        _ => {
            debug!("Structured completion has no usable answer, using raw text");
            raw.to_string()
        }
    };

    let service_ids = match object.remove("serviceIds") {
        Some(Value::Array(ids)) => ids,
        Some(other) => {
            debug!("serviceIds is a {}, ignoring", json_kind(&other));
            Vec::new()
        }
        None => Vec::new(),
    };

    ParsedCompletion::Structured {
        answer,
        service_ids,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_completion() {
        let parsed = parse_completion(r#"{"answer":"We help with email.","serviceIds":[0]}"#);
        assert_eq!(
            parsed,
            ParsedCompletion::Structured {
                answer: "We help with email.".to_string(),
                service_ids: vec![json!(0)],
            }
        );
    }

    #[test]
    fn test_plain_text_falls_back_verbatim() {
        for raw in [
            "Sorry, I cannot answer.",
            "",
            "{\"answer\": \"truncated",
            "```json\n{\"answer\": \"x\", \"serviceIds\": [1]}\n```",
        ] {
            let parsed = parse_completion(raw);
            assert_eq!(
                parsed,
                ParsedCompletion::Fallback {
                    answer: raw.to_string()
                }
            );
            assert!(parsed.service_ids().is_empty());
        }
    }

    #[test]
    fn test_non_object_json_falls_back() {
        for raw in ["42", "\"just a string\"", "[0, 1]", "null"] {
            assert!(parse_completion(raw).is_fallback(), "{} should fall back", raw);
        }
    }

    #[test]
    fn test_missing_answer_uses_raw_text() {
        let raw = r#"{"serviceIds":[1,2]}"#;
        let parsed = parse_completion(raw);
        assert_eq!(parsed.answer(), raw);
        assert_eq!(parsed.service_ids(), &[json!(1), json!(2)]);
    }

    #[test]
    fn test_non_string_answer_uses_raw_text() {
        let raw = r#"{"answer": 7, "serviceIds": []}"#;
        assert_eq!(parse_completion(raw).answer(), raw);
    }

    #[test]
    fn test_missing_or_malformed_service_ids_default_to_empty() {
        let parsed = parse_completion(r#"{"answer":"ok"}"#);
        assert!(!parsed.is_fallback());
        assert!(parsed.service_ids().is_empty());

        let parsed = parse_completion(r#"{"answer":"ok","serviceIds":"0,1"}"#);
        assert!(parsed.service_ids().is_empty());
    }

    #[test]
    fn test_ids_are_not_type_checked_here() {
        let parsed = parse_completion(r#"{"answer":"ok","serviceIds":[0,"1",-2,1.5,null]}"#);
        assert_eq!(parsed.service_ids().len(), 5);
    }
}
