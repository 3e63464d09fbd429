use regex::Regex;
use std::sync::OnceLock;

static SCRUB_PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

fn get_patterns() -> &'static Vec<(Regex, &'static str)> {
    SCRUB_PATTERNS.get_or_init(|| {
        vec![
            // Bearer tokens
            (
                Regex::new(r"(?i)Bearer\s+[A-Za-z0-9_\-./+]{20,}").unwrap(),
                "Bearer [REDACTED]",
            ),
            // OpenAI project / service keys, full or partially masked (sk-proj-abc***xyz)
            (
                Regex::new(r"sk-(?:proj-|svcacct-)?[A-Za-z0-9_\-]{2,}\*+[A-Za-z0-9_\-]*").unwrap(),
                "[REDACTED_OPENAI_KEY]",
            ),
            (
                Regex::new(r"sk-(?:proj-|svcacct-)?[A-Za-z0-9_\-]{20,}").unwrap(),
                "[REDACTED_OPENAI_KEY]",
            ),
        ]
    })
}

/// Redact API keys from upstream messages before they are logged or returned.
/// Upstream auth errors echo a masked prefix/suffix of the key that was sent.
pub fn scrub_secrets(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, replacement) in get_patterns() {
        result = pattern.replace_all(&result, *replacement).to_string();
    }
    result
}

/// Apply [`scrub_secrets`] to every string inside a JSON value.
pub fn scrub_json(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::String(s) => Value::String(scrub_secrets(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(scrub_json).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, scrub_json(v)))
                .collect(),
        ),
        other => other,
    }
}
