//! Cache key generation.
//!
//! A [`Fingerprint`] is the SHA-256 digest of a canonical JSON rendering of
//! `{ "messages": [...], "model": "..." }`. Canonical means object keys are
//! emitted in sorted order at every depth and no insignificant whitespace is
//! written, so the digest does not depend on how a caller happened to build
//! the payload.

use crate::types::Message;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// File extension used for persisted entries.
pub const ENTRY_EXTENSION: &str = "json";

static FINGERPRINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-f]{64}$").expect("static regex"));

/// Deterministic identifier of a `(model, messages)` request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a typed request.
    pub fn of(model: &str, messages: &[Message]) -> Self {
        let messages: Vec<Value> = messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role.as_str(),
                    "content": m.content,
                })
            })
            .collect();
        Self::from_parts(model, &messages)
    }

    /// Fingerprint a raw request body holding `model` and `messages`.
    ///
    /// Extra top-level fields (temperature, max_tokens, ...) are ignored, which
    /// keeps the key identical to [`Fingerprint::of`] for the same conversation.
    pub fn from_json(request: &Value) -> Self {
        let model = request["model"].as_str().unwrap_or_default();
        let messages = request["messages"].as_array().cloned().unwrap_or_default();
        Self::from_parts(model, &messages)
    }

    fn from_parts(model: &str, messages: &[Value]) -> Self {
        let mut root = serde_json::Map::new();
        root.insert("model".into(), Value::String(model.to_string()));
        root.insert("messages".into(), Value::Array(messages.to_vec()));

        let mut canonical = String::new();
        write_canonical(&Value::Object(root), &mut canonical);

        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Fingerprint(hash)
    }

    /// Accept an existing hex digest, e.g. a file stem read back from disk.
    pub fn parse(hex: &str) -> Option<Self> {
        FINGERPRINT_RE
            .is_match(hex)
            .then(|| Fingerprint(hex.to_string()))
    }

    /// Recover the fingerprint from an entry file name (`<hex>.json`).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(ENTRY_EXTENSION)?.strip_suffix('.')?;
        Self::parse(stem)
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, ENTRY_EXTENSION)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shorthand for [`Fingerprint::of`].
pub fn fingerprint(model: &str, messages: &[Message]) -> Fingerprint {
    Fingerprint::of(model, messages)
}

// Sorted-key, compact JSON writer. Independent of serde_json's map ordering,
// which changes when the `preserve_order` feature is unified in.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_sorts_nested_keys() {
        let v: Value = serde_json::from_str(r#"{"b":{"z":1,"a":[{"y":true,"x":null}]},"a":"s"}"#)
            .unwrap();
        let mut out = String::new();
        write_canonical(&v, &mut out);
        assert_eq!(out, r#"{"a":"s","b":{"a":[{"x":null,"y":true}],"z":1}}"#);
    }

    #[test]
    fn file_name_round_trip() {
        let fp = Fingerprint::of("gpt-4o", &[Message::user("hi")]);
        assert_eq!(fp.as_str().len(), 64);
        assert_eq!(Fingerprint::from_file_name(&fp.file_name()), Some(fp));
    }

    #[test]
    fn foreign_file_names_are_rejected() {
        let lower = "a".repeat(64);
        let upper = "A".repeat(64);
        for name in [
            "notes.json".to_string(),
            format!("{lower}.tmp"),
            format!("{upper}.json"),
            format!(".{lower}.json"),
        ] {
            assert!(Fingerprint::from_file_name(&name).is_none(), "{name}");
        }
    }
}
