//! Store-assigned identifiers.
//!
//! Tables may use text/uuid keys or integer sequences; either way the id is
//! handled as an opaque string.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize an optional id that may arrive as a JSON string or number.
/// `null`, missing and empty strings all become `None`.
pub fn opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
