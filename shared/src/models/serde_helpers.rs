//! Serde helpers for wire-format quirks

/// Deserialize an id that may arrive as a JSON string or number.
///
/// Locally created records use string ids; the hosted API returns numeric
/// database ids. Both normalize to `String`.
pub mod string_or_number {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => Ok(s),
            StringOrNumber::Number(n) => Ok(n.to_string()),
        }
    }

    pub fn serialize<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }
}
