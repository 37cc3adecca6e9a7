use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw attribute value as captured by the on-device collector. Shapes vary
/// wildly per probe (strings, numbers, nested maps, line arrays), so the
/// pipeline keeps them dynamic until a normalizer claims them.
pub type RawValue = serde_json::Value;

/// Canonical value emitted by a normalizer.
pub type NormalizedValue = serde_json::Value;

/// A single (key, value) pair pulled out of a device snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAttribute {
    pub key: String,
    pub value: RawValue,
    /// Snapshot collection time, Unix seconds or milliseconds. Only the
    /// uptime extraction needs it; everything else ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<i64>,
}

impl RawAttribute {
    pub fn new(key: impl Into<String>, value: RawValue) -> Self {
        Self {
            key: key.into(),
            value,
            collected_at: None,
        }
    }

    pub fn with_timestamp(key: impl Into<String>, value: RawValue, collected_at: i64) -> Self {
        Self {
            key: key.into(),
            value,
            collected_at: Some(collected_at),
        }
    }

    /// Collection time in Unix seconds; millisecond inputs are scaled
    /// down, disambiguated by magnitude.
    pub fn collected_at_seconds(&self) -> Option<i64> {
        self.collected_at
            .map(|ts| if ts > 10_000_000_000 { ts / 1000 } else { ts })
    }
}

/// Which collector subsystem produced an attribute. Classification is by
/// key alone; values never influence the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeDomain {
    /// Shell-command probe output (one of the fixed command aliases).
    Shell,
    /// Android content-provider dump (`content://` URI keys).
    ContentProvider,
    /// Reflection-explorer output (everything else).
    Sdk,
    /// Snapshot bookkeeping keys; consumed upstream, never normalized.
    Metadata,
}

impl AttributeDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeDomain::Shell => "shell",
            AttributeDomain::ContentProvider => "content_provider",
            AttributeDomain::Sdk => "sdk",
            AttributeDomain::Metadata => "metadata",
        }
    }
}

/// An attribute that survived normalization, tagged with its domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedAttribute {
    pub key: String,
    pub domain: AttributeDomain,
    pub value: NormalizedValue,
}

/// Per-snapshot accounting for logs and CLI summaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub total: usize,
    pub normalized: usize,
    pub dropped: usize,
}

/// Marker stored for attributes whose only signal is that the probe ran.
pub fn presence_marker() -> Value {
    Value::from(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collected_at_seconds_passthrough() {
        let attr = RawAttribute::with_timestamp("k", json!("v"), 1_704_897_130);
        assert_eq!(attr.collected_at_seconds(), Some(1_704_897_130));
    }

    #[test]
    fn test_collected_at_millis_scaled_down() {
        let attr = RawAttribute::with_timestamp("k", json!("v"), 1_704_897_130_456);
        assert_eq!(attr.collected_at_seconds(), Some(1_704_897_130));
    }

    #[test]
    fn test_collected_at_absent() {
        assert_eq!(RawAttribute::new("k", json!("v")).collected_at_seconds(), None);
    }

    #[test]
    fn test_domain_serializes_snake_case() {
        let serialized = serde_json::to_value(AttributeDomain::ContentProvider).unwrap();
        assert_eq!(serialized, json!("content_provider"));
    }
}
