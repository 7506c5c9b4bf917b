//! Shared utility functions for type serialization and common operations.
//!
//! ## Lenient Deserializers
//!
//! LLM output and older stored rows disagree on shapes. These helpers accept
//! the variants seen in practice:
//! - `lenient_f64` - numbers or numeric strings
//! - `lenient_string_vec` - string arrays, or arrays of `{name|title, description}` objects
//! - `lenient_string` - strings, or any other JSON rendered as text

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt::Display;

// =============================================================================
// Lenient Deserializers
// =============================================================================

/// Accept a number, a numeric string, or null (as 0.0).
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value).unwrap_or(0.0))
}

/// Convert a JSON value into a float when it carries one.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches("/10").trim().parse().ok(),
        _ => None,
    }
}

/// Accept string arrays and arrays of objects carrying a name/title.
pub fn lenient_string_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_string_vec(&value))
}

pub fn value_as_string_vec(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(item_as_text).collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

fn item_as_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Object(map) => {
            let name = json_string(item, "name").or_else(|| json_string(item, "title"))?;
            match map.get("description").and_then(|d| d.as_str()) {
                Some(desc) if !desc.is_empty() => Some(format!("{}: {}", name, desc)),
                _ => Some(name),
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accept a string; render anything else (except null) as compact JSON.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

// =============================================================================
// JSON Value Extraction Helpers
// =============================================================================

/// Extract string from JSON value by key.
#[inline]
pub fn json_string(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(String::from)
}

/// Extract f64 with default.
#[inline]
pub fn json_f64(value: &Value, key: &str, default: f64) -> f64 {
    value.get(key).and_then(value_as_f64).unwrap_or(default)
}

// =============================================================================
// String Utilities
// =============================================================================

/// Capitalize the first character of a string.
#[inline]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Cut text to at most `max_chars` characters on a char boundary, adding an ellipsis.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

// =============================================================================
// Type Parsing
// =============================================================================

/// Trait for parsing strings into enum types with a default fallback.
/// Invalid strings fall back gracefully and are logged.
pub trait ParseWithDefault: Sized {
    /// The name of this type for logging purposes.
    fn type_name() -> &'static str;

    /// The default value to use when parsing fails.
    fn default_value() -> Self;

    /// Try to parse the string, returning None if invalid.
    fn try_parse(s: &str) -> Option<Self>;

    /// Parse a string into this type, returning a default value if parsing fails.
    fn parse_or_default(s: &str) -> Self {
        match Self::try_parse(s) {
            Some(v) => v,
            None => {
                tracing::warn!("Invalid {} value '{}', using default", Self::type_name(), s);
                Self::default_value()
            }
        }
    }
}

// =============================================================================
// Error Logging Helpers
// =============================================================================

/// Log errors at debug level and convert to Option.
/// Use for filter_map over row iterators where bad rows are skipped.
pub fn log_filter_error<T, E: Display>(result: Result<T, E>, context: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::debug!("{}: {}", context, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_as_f64_variants() {
        assert_eq!(value_as_f64(&json!(7)), Some(7.0));
        assert_eq!(value_as_f64(&json!("6.5")), Some(6.5));
        assert_eq!(value_as_f64(&json!("8/10")), Some(8.0));
        assert_eq!(value_as_f64(&json!(null)), None);
        assert_eq!(value_as_f64(&json!("high")), None);
    }

    #[test]
    fn test_value_as_string_vec_objects() {
        let value = json!([
            "Realtime sync",
            {"name": "Dashboards", "description": "Team overview"},
            {"title": "Exports"},
            null
        ]);
        assert_eq!(
            value_as_string_vec(&value),
            vec!["Realtime sync", "Dashboards: Team overview", "Exports"]
        );
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("a longer sentence here", 8), "a longer…");
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("task tracker"), "Task tracker");
        assert_eq!(capitalize_first(""), "");
    }
}
