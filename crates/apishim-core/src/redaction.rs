//! Sensitive data redaction for logged parameter bags

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const MASK: &str = "***";

static INLINE_SECRET: OnceLock<Option<Regex>> = OnceLock::new();

fn inline_secret() -> Option<&'static Regex> {
    INLINE_SECRET
        .get_or_init(|| {
            Regex::new(r#"(?i)(api[_-]?key|apikey|token|bearer|password|passwd|pwd)[=:\s]+['"]?([^\s'"&]{3,})['"]?"#)
                .ok()
        })
        .as_ref()
}

/// Mask `key=value` style secrets embedded in free text
pub fn redact_sensitive(input: &str) -> String {
    match inline_secret() {
        Some(regex) => regex.replace_all(input, "$1=***").into_owned(),
        None => input.to_string(),
    }
}

/// Mask values under sensitive keys, recursively
pub fn redact_json_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if is_sensitive_key(key) {
                    *val = Value::String(MASK.to_string());
                } else {
                    redact_json_value(val);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_json_value),
        Value::String(s) => *s = redact_sensitive(s),
        _ => {}
    }
}

/// Redacted JSON view of query pairs, for logging
pub fn redact_pairs(pairs: &[(String, String)]) -> Value {
    let mut value = Value::Object(
        pairs
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    );
    redact_json_value(&mut value);
    value
}

pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    ["key", "token", "password", "passwd", "secret", "credential", "auth"]
        .iter()
        .any(|needle| key.contains(needle))
}
