use serde_json::Value;

use crate::constants::SKIP_SENTINELS;

/// Decides whether a raw value carries no usable data and should be
/// dropped before any normalization runs.
///
/// Strings match the sentinel vocabulary case-insensitively because the
/// collector's error paths are inconsistent about casing. Inside lists the
/// comparison is exact: a list element must be falsy or literally equal to
/// a sentinel to count as empty.
pub fn is_skipped(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty() || SKIP_SENTINELS.contains(&s.to_uppercase().as_str()),
        Value::Array(items) => {
            items.is_empty() || items.iter().all(|item| is_falsy(item) || is_sentinel(item))
        }
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn is_sentinel(value: &Value) -> bool {
    value
        .as_str()
        .map(|s| SKIP_SENTINELS.contains(&s))
        .unwrap_or(false)
}
