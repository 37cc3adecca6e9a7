mod content_provider;
mod sdk;
mod shell;

pub use content_provider::ContentProviderNormalizer;
pub use sdk::SdkReflectionNormalizer;
pub use shell::ShellOutputNormalizer;

use crate::types::{AttributeDomain, NormalizedValue, RawAttribute};

/// Domain-specific normalization strategy. Implementations own exactly
/// one domain and return `None` for attributes they drop: there is no
/// error path out of normalization, every outcome is keep or drop.
pub trait AttributeNormalizer: Send + Sync {
    /// Domain this normalizer owns.
    fn domain(&self) -> AttributeDomain;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Produces the canonical value, or `None` to drop the attribute.
    fn normalize(&self, attribute: &RawAttribute) -> Option<NormalizedValue>;
}
