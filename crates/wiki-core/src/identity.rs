//! Document identifier normalization and allocation.
//!
//! Ids travel as strings but clients may send numbers. New ids are allocated
//! as one past the largest numeric id in the store; ids that do not start
//! with digits are ignored when computing that maximum.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Normalize a raw JSON id (string, number, null, missing) into a trimmed string.
///
/// Returns an empty string for anything that is not a usable id.
pub fn normalize_id_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Serde helper accepting a string or number id.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(normalize_id_value(value.as_ref()))
}

/// Numeric value of an id, reading leading digits the way a lenient integer
/// parser would (`"12abc"` is 12). Negative and digitless ids yield `None`.
pub fn numeric_id(id: &str) -> Option<u64> {
    let trimmed = id.trim_start();
    let unsigned = match trimmed.as_bytes().first() {
        Some(b'-') => return None,
        Some(b'+') => &trimmed[1..],
        _ => trimmed,
    };

    let digits: &str = {
        let end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        &unsigned[..end]
    };
    if digits.is_empty() {
        return None;
    }
    // Saturate absurdly long digit runs instead of dropping them.
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

/// One past the largest numeric id among `ids` (1 for an empty store).
pub fn next_document_id<'a, I>(ids: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    ids.into_iter()
        .filter_map(numeric_id)
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}

/// Reuse `requested` when non-empty after trimming, otherwise allocate.
pub fn resolve_document_id<'a, I>(requested: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let requested = requested.trim();
    if requested.is_empty() {
        next_document_id(existing).to_string()
    } else {
        requested.to_string()
    }
}
