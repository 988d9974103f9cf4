use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

const ENVELOPE_KEYS: &[&str] = &["data", "success", "message", "status", "meta"];

/// Unwraps `{"data": X, "success": true, ...}` to `X`. Bodies that carry any
/// key outside the envelope vocabulary are resources in their own right and
/// are returned untouched, so a record whose payload field is named `data`
/// is never mistaken for an envelope.
pub fn unwrap_envelope(body: JsonValue) -> JsonValue {
    match body {
        JsonValue::Object(mut map) if is_envelope(&map) => {
            map.remove("data").unwrap_or(JsonValue::Null)
        }
        other => other,
    }
}

fn is_envelope(map: &Map<String, JsonValue>) -> bool {
    map.contains_key("data") && map.keys().all(|k| ENVELOPE_KEYS.contains(&k.as_str()))
}

/// Pulls a human message and per-field messages out of an error body.
/// Accepts `error`, `message`, and `errors` (object of field to string or
/// list of strings) in any combination; plain-text bodies become the message.
pub fn extract_error(raw: &str, fallback: &str) -> (String, BTreeMap<String, Vec<String>>) {
    let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();

    let Ok(body) = serde_json::from_str::<JsonValue>(raw) else {
        let text = raw.trim();
        let message = if text.is_empty() || text.starts_with('<') {
            fallback.to_string()
        } else {
            text.to_string()
        };
        return (message, fields);
    };

    if let Some(errors) = body.get("errors").and_then(|v| v.as_object()) {
        for (field, value) in errors {
            let messages = match value {
                JsonValue::String(s) => vec![s.clone()],
                JsonValue::Array(items) => items
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            };
            if !messages.is_empty() {
                fields.insert(field.clone(), messages);
            }
        }
    }

    let message = ["error", "message"]
        .iter()
        .find_map(|key| match body.get(*key) {
            Some(JsonValue::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(JsonValue::Object(inner)) => inner
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            _ => None,
        })
        .or_else(|| fields.values().next().and_then(|m| m.first().cloned()))
        .unwrap_or_else(|| fallback.to_string());

    (message, fields)
}
