use crate::constants::{is_content_provider_attribute, is_metadata_attribute, is_shell_attribute};
use crate::types::AttributeDomain;

/// Assigns every attribute key to exactly one domain. Keys are matched
/// verbatim; unknown keys land in the reflection domain because the
/// collector builds those names dynamically (`class.member`) and the full
/// set is open-ended.
///
/// Precedence is fixed: bookkeeping keys first, then the shell command
/// aliases, then the `content://` scheme, then everything else.
pub fn classify(key: &str) -> AttributeDomain {
    if is_metadata_attribute(key) {
        return AttributeDomain::Metadata;
    }
    if is_shell_attribute(key) {
        return AttributeDomain::Shell;
    }
    if is_content_provider_attribute(key) {
        return AttributeDomain::ContentProvider;
    }
    AttributeDomain::Sdk
}
