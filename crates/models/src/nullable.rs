//! Inbound payload fields where `null` means the same as absent.

use serde::{Deserialize, Deserializer};

/// Deserialize `T`, mapping JSON `null` to `T::default()`. Pair with
/// `#[serde(default)]` so a missing field behaves the same way.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
