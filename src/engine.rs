use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::classifier::classify;
use crate::constants::TIMESTAMP_ATTRIBUTE;
use crate::decoder::{BuiltinDecoder, CommandDecoder};
use crate::error::{NormalizerError, Result};
use crate::normalize::{
    AttributeNormalizer, ContentProviderNormalizer, SdkReflectionNormalizer, ShellOutputNormalizer,
};
use crate::types::{AttributeDomain, NormalizedAttribute, RawAttribute, SnapshotSummary};

/// Result of normalizing one device snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedSnapshot {
    pub attributes: Vec<NormalizedAttribute>,
    pub summary: SnapshotSummary,
}

/// Routes each raw attribute to the normalizer owning its domain.
/// Construction wires the command decoder through to the shell
/// normalizer; everything else is stateless.
pub struct NormalizerEngine {
    shell: ShellOutputNormalizer,
    content_provider: ContentProviderNormalizer,
    sdk: SdkReflectionNormalizer,
}

impl NormalizerEngine {
    pub fn new(decoder: Arc<dyn CommandDecoder>) -> Self {
        Self {
            shell: ShellOutputNormalizer::new(decoder),
            content_provider: ContentProviderNormalizer::new(),
            sdk: SdkReflectionNormalizer::new(),
        }
    }

    /// Normalizes one attribute, or `None` when it carries no signal.
    /// Metadata keys are consumed upstream and always drop here.
    pub fn normalize(&self, attribute: &RawAttribute) -> Option<NormalizedAttribute> {
        let domain = classify(&attribute.key);
        let normalizer: &dyn AttributeNormalizer = match domain {
            AttributeDomain::Shell => &self.shell,
            AttributeDomain::ContentProvider => &self.content_provider,
            AttributeDomain::Sdk => &self.sdk,
            AttributeDomain::Metadata => return None,
        };
        match normalizer.normalize(attribute) {
            Some(value) => Some(NormalizedAttribute {
                key: attribute.key.clone(),
                domain,
                value,
            }),
            None => {
                debug!("dropped {} attribute: {}", normalizer.name(), attribute.key);
                None
            }
        }
    }

    /// Normalizes a whole snapshot object. The snapshot's `timestamp`
    /// bookkeeping value feeds the uptime extraction; attributes come out
    /// in the snapshot's (sorted) key order.
    pub fn normalize_snapshot(&self, snapshot: &Value) -> Result<NormalizedSnapshot> {
        let Value::Object(entries) = snapshot else {
            return Err(NormalizerError::Snapshot(
                "snapshot root must be a JSON object".to_string(),
            ));
        };
        let collected_at = entries.get(TIMESTAMP_ATTRIBUTE).and_then(Value::as_i64);

        let mut attributes = Vec::new();
        let mut summary = SnapshotSummary {
            total: entries.len(),
            ..Default::default()
        };
        for (key, value) in entries {
            let attribute = RawAttribute {
                key: key.clone(),
                value: value.clone(),
                collected_at,
            };
            match self.normalize(&attribute) {
                Some(normalized) => {
                    summary.normalized += 1;
                    attributes.push(normalized);
                }
                None => summary.dropped += 1,
            }
        }
        info!(
            "normalized snapshot: {}/{} attributes kept, {} dropped",
            summary.normalized, summary.total, summary.dropped
        );
        Ok(NormalizedSnapshot {
            attributes,
            summary,
        })
    }
}

impl Default for NormalizerEngine {
    fn default() -> Self {
        Self::new(Arc::new(BuiltinDecoder::new()))
    }
}
