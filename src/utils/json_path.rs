//! Dot-notation path lookup for provider response bodies.
//!
//! Supports nested keys and array indexing, e.g. `choices[0].message.content`
//! or `content.0.text`.

use serde_json::Value;

/// Path mapper for extracting values from JSON using dot-notation paths
pub struct PathMapper;

impl PathMapper {
    /// Get value from JSON using dot-notation path (supports array indexing)
    ///
    /// Examples:
    /// - "choices[0].delta.content"
    /// - "content[0].text"
    /// - "delta.text"
    pub fn get_path<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
        if path.is_empty() {
            return None;
        }

        // Remove leading "$." if present (JSONPath style)
        let normalized = path.trim().trim_start_matches("$.");
        let mut current = obj;

        for part in normalized.split('.') {
            if part.is_empty() {
                return None;
            }

            // e.g. "choices[0]"
            if let Some(bracket_pos) = part.find('[') {
                let key = &part[..bracket_pos];
                let idx_str = part[bracket_pos + 1..].trim_end_matches(']');

                if !key.is_empty() {
                    current = current.as_object()?.get(key)?;
                }
                let idx = idx_str.parse::<usize>().ok()?;
                current = current.as_array()?.get(idx)?;
            } else {
                match current {
                    Value::Object(map) => {
                        current = map.get(part)?;
                    }
                    // "choices.0.delta" style
                    Value::Array(arr) => {
                        current = arr.get(part.parse::<usize>().ok()?)?;
                    }
                    _ => return None,
                }
            }
        }

        Some(current)
    }

    /// String at `path`, or `None` when missing or not a string.
    pub fn get_str<'a>(obj: &'a Value, path: &str) -> Option<&'a str> {
        Self::get_path(obj, path).and_then(Value::as_str)
    }
}
