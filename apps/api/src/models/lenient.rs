//! Field-level tolerant decoding for referral data.
//!
//! A referral record is hand-edited JSON; one bad field must not cost the
//! whole record. These helpers are used with `#[serde(default,
//! deserialize_with = ...)]` and turn an unusable value into "absent".

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// `null` or a value that does not decode as `T` becomes `None`.
pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode(value))
}

/// `null` or a value that does not decode as `T` becomes `T::default()`.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    optional(deserializer).map(Option::unwrap_or_default)
}

/// Keeps the entries of a list that decode as `T` and drops the rest.
/// Anything other than an array becomes an empty list.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    optional_list(deserializer).map(Option::unwrap_or_default)
}

/// Like `list`, but a missing or non-array value stays `None`.
pub fn optional_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(items.into_iter().filter_map(decode).collect())),
        Value::Null => Ok(None),
        other => {
            warn!("Dropping malformed list value: expected an array, got {other}");
            Ok(None)
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Option<T> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(
                "Dropping malformed {} value: {e}",
                std::any::type_name::<T>()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Item {
        id: u32,
    }

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "super::optional")]
        label: Option<String>,
        #[serde(default, deserialize_with = "super::or_default")]
        text: String,
        #[serde(default, deserialize_with = "super::list")]
        tags: Vec<String>,
        #[serde(default, deserialize_with = "super::optional_list")]
        items: Option<Vec<Item>>,
    }

    #[test]
    fn test_null_and_wrong_types_become_absent() {
        let holder: Holder = serde_json::from_value(json!({
            "label": 5,
            "text": null,
            "tags": "not a list",
            "items": { "id": 1 }
        }))
        .unwrap();
        assert_eq!(holder.label, None);
        assert_eq!(holder.text, "");
        assert!(holder.tags.is_empty());
        assert!(holder.items.is_none());
    }

    #[test]
    fn test_list_keeps_only_valid_entries() {
        let holder: Holder = serde_json::from_value(json!({
            "tags": ["a", 1, "b", null],
            "items": [{ "id": 1 }, { "id": "two" }, { "id": 3 }]
        }))
        .unwrap();
        assert_eq!(holder.tags, vec!["a", "b"]);
        let ids: Vec<u32> = holder.items.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let holder: Holder = serde_json::from_value(json!({})).unwrap();
        assert_eq!(holder.label, None);
        assert!(holder.items.is_none());
    }
}
