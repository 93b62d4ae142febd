use serde_json::Value;

/// Outcome of looking for the reply text in a Langflow response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    /// Reply text found by one of the strategies.
    Reply(String),
    /// Valid JSON, but no strategy matched. Carries the payload so the
    /// caller can show what actually came back.
    Unrecognized(Value),
}

/// One way of locating the reply in a response payload.
type Strategy = fn(&Value) -> Option<String>;

/// Strategies in priority order. Earlier entries win; each one either
/// produces a non-empty string or passes to the next.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("top-level Text", |v| field_text(v, "Text")),
    ("top-level text", |v| field_text(v, "text")),
    ("outputs message.data.text", nested_message_data_text),
    ("outputs message.text", nested_message_text),
];

/// Find the reply text in `payload`, trying each known response shape in
/// order. The Langflow API has returned several layouts over time and
/// none of them is a guaranteed schema, so this is deliberately lenient:
/// a field that is missing, not a string, or an empty string falls
/// through to the next strategy. Empty replies are therefore
/// indistinguishable from absent fields.
pub fn reply_text(payload: &Value) -> Extracted {
    for (name, strategy) in STRATEGIES {
        if let Some(text) = strategy(payload) {
            tracing::debug!(strategy = *name, "extracted reply");
            return Extracted::Reply(text);
        }
    }
    tracing::warn!("no extraction strategy matched response payload");
    Extracted::Unrecognized(payload.clone())
}

/// Non-empty string field lookup. Empty counts as absent.
fn field_text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// First element of `outputs[0].outputs[0].results.message`, where the
/// deeply-nested run responses keep the chat output.
fn first_output_message(value: &Value) -> Option<&Value> {
    value
        .get("outputs")?
        .get(0)?
        .get("outputs")?
        .get(0)?
        .get("results")?
        .get("message")
}

fn nested_message_data_text(value: &Value) -> Option<String> {
    first_output_message(value).and_then(|msg| field_text(msg.get("data")?, "text"))
}

fn nested_message_text(value: &Value) -> Option<String> {
    first_output_message(value).and_then(|msg| field_text(msg, "text"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(payload: &Value) -> Extracted {
        reply_text(payload)
    }

    #[test]
    fn test_top_level_capital_text() {
        let payload = json!({"Text": "hi"});
        assert_eq!(reply(&payload), Extracted::Reply("hi".to_string()));
    }

    #[test]
    fn test_top_level_lowercase_text() {
        let payload = json!({"text": "hi"});
        assert_eq!(reply(&payload), Extracted::Reply("hi".to_string()));
    }

    #[test]
    fn test_capital_text_wins_over_lowercase() {
        let payload = json!({"Text": "first", "text": "second"});
        assert_eq!(reply(&payload), Extracted::Reply("first".to_string()));
    }

    #[test]
    fn test_nested_message_data_text() {
        let payload = json!({
            "outputs": [{
                "outputs": [{
                    "results": {"message": {"data": {"text": "nested"}}}
                }]
            }]
        });
        assert_eq!(reply(&payload), Extracted::Reply("nested".to_string()));
    }

    #[test]
    fn test_nested_message_text_fallback() {
        let payload = json!({
            "outputs": [{
                "outputs": [{
                    "results": {"message": {"text": "fallback"}}
                }]
            }]
        });
        assert_eq!(reply(&payload), Extracted::Reply("fallback".to_string()));
    }

    #[test]
    fn test_empty_object_is_unrecognized() {
        let payload = json!({});
        assert_eq!(reply(&payload), Extracted::Unrecognized(json!({})));
    }

    #[test]
    fn test_wrong_typed_field_falls_through() {
        // `Text` is a number, so the nested shape should still be found
        let payload = json!({
            "Text": 42,
            "outputs": [{
                "outputs": [{
                    "results": {"message": {"text": "real"}}
                }]
            }]
        });
        assert_eq!(reply(&payload), Extracted::Reply("real".to_string()));
    }

    #[test]
    fn test_empty_string_treated_as_absent() {
        let payload = json!({"Text": "", "text": "next"});
        assert_eq!(reply(&payload), Extracted::Reply("next".to_string()));
    }

    #[test]
    fn test_empty_outputs_array_is_unrecognized() {
        let payload = json!({"outputs": []});
        assert!(matches!(reply(&payload), Extracted::Unrecognized(_)));
    }

    #[test]
    fn test_non_object_payloads_never_panic() {
        for payload in [json!(null), json!("just a string"), json!([1, 2, 3]), json!(7)] {
            assert!(matches!(reply(&payload), Extracted::Unrecognized(_)));
        }
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let payload = json!({"text": "same"});
        assert_eq!(reply(&payload), reply(&payload));
    }

    #[test]
    fn test_unrecognized_carries_original_payload() {
        let payload = json!({"detail": "unexpected"});
        match reply(&payload) {
            Extracted::Unrecognized(v) => assert_eq!(v, payload),
            other => panic!("expected Unrecognized, got {:?}", other),
        }
    }
}
