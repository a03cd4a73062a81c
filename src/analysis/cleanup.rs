//! Normalization of raw model replies

use serde_json::Value;

const LANGUAGE_FENCE: &str = "```json";
const BARE_FENCE: &str = "```";

/// Strip surrounding whitespace and every Markdown code fence marker.
///
/// Both ```` ```json ```` (any case) and bare ```` ``` ```` markers are removed,
/// together with one newline directly following them.
pub fn strip_code_fences(text: &str) -> String {
    let text = remove_marker(text.trim(), LANGUAGE_FENCE);
    let text = remove_marker(&text, BARE_FENCE);
    text.trim().to_string()
}

/// Case-insensitive removal of an ASCII `marker` and an optional trailing `\n`.
fn remove_marker(text: &str, marker: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    while let Some(pos) = lower[cursor..].find(marker) {
        let start = cursor + pos;
        out.push_str(&text[cursor..start]);
        cursor = start + marker.len();
        if text[cursor..].starts_with('\n') {
            cursor += 1;
        }
    }

    out.push_str(&text[cursor..]);
    out
}

/// Parse a cleaned reply. Only a JSON object counts as a usable note.
pub fn parse_record_json(cleaned: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(cleaned) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
