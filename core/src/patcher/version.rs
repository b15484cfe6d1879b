#![deny(missing_docs)]

//! # Version Downgrade
//!
//! The upstream HSDS document declares OpenAPI `3.1.0`, which the downstream
//! parser rejects. Every occurrence of the token is rewritten to `3.0.3`
//! before any structural work happens.

/// Version token declared by the upstream document.
pub const UPSTREAM_VERSION: &str = "3.1.0";

/// Version token accepted by the downstream parser.
pub const TARGET_VERSION: &str = "3.0.3";

/// Replaces every occurrence of the upstream version token with the target
/// token. A document that already carries the target token passes through
/// unchanged.
pub fn downgrade_version(document: &str) -> String {
    document.replace(UPSTREAM_VERSION, TARGET_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downgrade_replaces_token() {
        let input = "openapi: 3.1.0\ninfo:\n  version: 3.1.0\n";
        let output = downgrade_version(input);
        assert!(!output.contains(UPSTREAM_VERSION));
        assert_eq!(output.matches(TARGET_VERSION).count(), 2);
    }

    #[test]
    fn test_downgrade_is_idempotent() {
        let input = "openapi: 3.0.3\n";
        let once = downgrade_version(input);
        let twice = downgrade_version(&once);
        assert_eq!(once, input);
        assert_eq!(twice, input);
    }

    #[test]
    fn test_unrelated_versions_untouched() {
        let input = "info:\n  version: 2.0.0\n";
        assert_eq!(downgrade_version(input), input);
    }
}
