use serde_json::{Map, Value};

use crate::constants::{is_content_provider_attribute, is_settings_provider_attribute};
use crate::skip::is_skipped;
use crate::types::{presence_marker, AttributeDomain, NormalizedValue, RawAttribute};

use super::AttributeNormalizer;

/// Normalizes `content://` dumps. The six settings endpoints coalesce
/// into name/value maps; any other provider only proves it was reachable,
/// so its rows collapse to the presence marker.
#[derive(Debug, Default)]
pub struct ContentProviderNormalizer;

impl ContentProviderNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl AttributeNormalizer for ContentProviderNormalizer {
    fn domain(&self) -> AttributeDomain {
        AttributeDomain::ContentProvider
    }

    fn name(&self) -> &'static str {
        "content_provider"
    }

    fn normalize(&self, attribute: &RawAttribute) -> Option<NormalizedValue> {
        if !is_content_provider_attribute(&attribute.key) {
            return None;
        }
        if is_skipped(&attribute.value) {
            return None;
        }
        if is_settings_provider_attribute(&attribute.key) {
            return coalesce_settings(&attribute.value);
        }
        Some(presence_marker())
    }
}

/// Folds multi-row `{name, value}` dumps into a single map. Later rows
/// win on duplicate names; rows missing either field are ignored. Values
/// that are not row lists pass through untouched.
fn coalesce_settings(value: &Value) -> Option<NormalizedValue> {
    let Value::Array(rows) = value else {
        return Some(value.clone());
    };
    let mut settings = Map::new();
    for row in rows {
        let Value::Object(fields) = row else { continue };
        let (Some(name), Some(setting)) = (fields.get("name"), fields.get("value")) else {
            continue;
        };
        let Some(name) = name.as_str() else { continue };
        settings.insert(name.to_string(), setting.clone());
    }
    if settings.is_empty() {
        return None;
    }
    Some(Value::Object(settings))
}
