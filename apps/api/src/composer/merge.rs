//! JSON deep merge used to overlay a referral record on the default record.

use serde_json::Value;
use tracing::warn;

/// Overlays `overlay` on `base` and returns the result.
///
/// - Objects merge recursively, key by key.
/// - Arrays and scalars in the overlay replace the base value wholesale.
/// - `null` in the overlay counts as absent and keeps the base value.
/// - An overlay value whose JSON type differs from a non-null base value is
///   skipped, so a malformed record cannot corrupt the default shape.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    let (Value::Object(base_map), Value::Object(overlay_map)) = (base, overlay) else {
        return merge_value(base, overlay);
    };

    let mut result = base_map.clone();
    for (key, value) in overlay_map {
        let merged = match result.get(key) {
            Some(existing) => {
                if value.is_null() {
                    continue;
                }
                if !existing.is_null() && !same_kind(existing, value) {
                    warn!("Skipping field '{key}': overlay type does not match default");
                    continue;
                }
                merge_value(existing, value)
            }
            None if value.is_null() => continue,
            None => value.clone(),
        };
        result.insert(key.clone(), merged);
    }
    Value::Object(result)
}

fn merge_value(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(_), Value::Object(_)) => deep_merge(base, overlay),
        (_, Value::Null) => base.clone(),
        _ => overlay.clone(),
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}
