use serde_json::Value;
use std::collections::HashMap;

/// Replacement text for anything secret.
pub const REDACTED: &str = "[REDACTED]";

/// Headers that contain security-sensitive values and must be redacted.
pub const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// JSON keys whose values are always redacted.
const SENSITIVE_KEYS: &[&str] = &["token", "secret", "password"];

pub struct Sanitizer;

impl Sanitizer {
    /// Check if a header name is sensitive and should be redacted.
    pub fn is_sensitive_header(header_name: &str) -> bool {
        let lower = header_name.to_lowercase();
        SENSITIVE_HEADERS.contains(&lower.as_str())
    }

    /// Remove sensitive data from headers
    pub fn sanitize_headers(headers: &HashMap<String, String>) -> HashMap<String, String> {
        headers
            .iter()
            .map(|(key, value)| {
                let value = if Self::is_sensitive_header(key) {
                    REDACTED.to_string()
                } else {
                    value.clone()
                };
                (key.clone(), value)
            })
            .collect()
    }

    /// Redact credentials embedded in a URL.
    ///
    /// The Telegram Bot API carries the bot token as a path segment
    /// (`/bot<token>/sendMessage`), so the path is scrubbed as well as any
    /// `token` query parameter.
    pub fn sanitize_url(url: &str) -> String {
        let (base, query) = match url.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (url, None),
        };

        let path = base
            .split('/')
            .map(|segment| match segment.strip_prefix("bot") {
                Some(rest) if rest.contains(':') => format!("bot{}", REDACTED),
                _ => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/");

        match query {
            None => path,
            Some(query) => {
                let query = query
                    .split('&')
                    .map(|pair| match pair.split_once('=') {
                        Some((key, _)) if SENSITIVE_KEYS.contains(&key.to_lowercase().as_str()) => {
                            format!("{}={}", key, REDACTED)
                        }
                        _ => pair.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("&");
                format!("{}?{}", path, query)
            }
        }
    }

    /// Remove sensitive data from JSON payloads
    pub fn sanitize_json(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut sanitized = serde_json::Map::new();
                for (key, val) in map {
                    let sanitized_val = if SENSITIVE_KEYS.contains(&key.to_lowercase().as_str()) {
                        Value::String(REDACTED.to_string())
                    } else {
                        Self::sanitize_json(val)
                    };
                    sanitized.insert(key.clone(), sanitized_val);
                }
                Value::Object(sanitized)
            }
            Value::Array(arr) => Value::Array(arr.iter().map(Self::sanitize_json).collect()),
            _ => value.clone(),
        }
    }
}
