#![deny(missing_docs)]

//! # Client Generation
//!
//! The strategy seam between the parsed document and the per-language
//! emitters. A [`ClientGenerator`] consumes the parsed API together with an
//! immutable [`Settings`] value and renders one complete client source file.

pub mod csharp;
pub mod python;

use crate::error::AppResult;
use crate::oas::{ParsedApi, ParsedOperation};
use indexmap::IndexMap;

/// Resolver from `(method, path)` to the generated operation name.
pub type OperationNameResolver = fn(&str, &str) -> AppResult<&'static str>;

/// Generation settings, passed by value to every generator call.
///
/// This is deliberately a plain immutable struct rather than ambient state;
/// callers construct it once and hand it down.
#[derive(Clone)]
pub struct Settings {
    /// Namespace (C#) or module docstring title (Python) of the output.
    pub namespace: String,
    /// Name of the root client type.
    pub client_name: String,
    /// Name of the generated exception type.
    pub exception_type: String,
    /// Prefix for synthesized status code strings, e.g. `H` yields
    /// `H00.<http status>` for HTTP failures and `H01` for
    /// deserialization failures.
    pub exception_code_prefix: String,
    /// Resolver for generated method names.
    pub operation_name: OperationNameResolver,
    /// Emit a client suited for browser/WebAssembly hosts.
    pub wasm_support: bool,
    /// Emit bearer token storage and sign-in plumbing.
    pub refresh_token_support: bool,
    /// Emit Nexus platform extras (configuration header helpers).
    pub nexus_features: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            namespace: "Hsds.Api".into(),
            client_name: "HsdsClient".into(),
            exception_type: "HsdsException".into(),
            exception_code_prefix: "H".into(),
            operation_name: crate::naming::resolve_operation_name,
            wasm_support: false,
            refresh_token_support: false,
            nexus_features: false,
        }
    }
}

/// A strategy trait for decoupling language-specific client emission.
pub trait ClientGenerator {
    /// Lowercase language identifier, used for logging and output selection.
    fn language(&self) -> &'static str;

    /// File name of the generated client source.
    fn file_name(&self, settings: &Settings) -> String;

    /// Renders the complete client source file.
    fn generate(&self, api: &ParsedApi, settings: &Settings) -> AppResult<String>;
}

/// Groups operations by their first tag, preserving declaration order.
/// Untagged operations land in the `Api` group.
pub(crate) fn group_by_tag(api: &ParsedApi) -> IndexMap<String, Vec<&ParsedOperation>> {
    let mut groups: IndexMap<String, Vec<&ParsedOperation>> = IndexMap::new();

    for op in &api.operations {
        let tag = op.tag.clone().unwrap_or_else(|| "Api".to_string());
        groups.entry(tag).or_default().push(op);
    }

    groups
}

/// Name suffixes for the emitted method variants of one operation.
///
/// An operation whose success response offers both JSON and octet-stream
/// renders two methods; otherwise a single method without a suffix.
pub(crate) fn variant_suffixes(op: &ParsedOperation) -> Vec<MethodVariant> {
    match (op.response.json, op.response.stream) {
        (true, true) => vec![
            MethodVariant {
                suffix: "AsJson",
                body: VariantBody::Json,
            },
            MethodVariant {
                suffix: "AsStream",
                body: VariantBody::Stream,
            },
        ],
        (true, false) => vec![MethodVariant {
            suffix: "",
            body: VariantBody::Json,
        }],
        (false, true) => vec![MethodVariant {
            suffix: "",
            body: VariantBody::Stream,
        }],
        (false, false) => vec![MethodVariant {
            suffix: "",
            body: VariantBody::None,
        }],
    }
}

/// One emitted method variant of an operation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MethodVariant {
    /// Name suffix inserted after the operation name.
    pub suffix: &'static str,
    /// How the response body is surfaced to the caller.
    pub body: VariantBody,
}

/// Response surface of an emitted method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VariantBody {
    /// Deserialized JSON value.
    Json,
    /// Raw response handle for streaming.
    Stream,
    /// No payload.
    None,
}

/// Accept header sent by an emitted method variant.
pub(crate) fn accept_header(body: VariantBody) -> Option<&'static str> {
    match body {
        VariantBody::Json => Some("application/json"),
        VariantBody::Stream => Some("application/octet-stream"),
        VariantBody::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::{ParsedOperation, ResponseMedia};

    fn operation(method: &str, path: &str, tag: Option<&str>, media: ResponseMedia) -> ParsedOperation {
        ParsedOperation {
            method: method.to_string(),
            path: path.to_string(),
            tag: tag.map(str::to_string),
            summary: None,
            description: None,
            operation_id: None,
            parameters: vec![],
            has_body: false,
            body_required: false,
            response: media,
        }
    }

    #[test]
    fn test_group_by_tag_preserves_order() {
        let api = ParsedApi {
            title: "T".into(),
            version: "1".into(),
            description: None,
            operations: vec![
                operation("GET", "/", Some("Domain"), ResponseMedia::default()),
                operation("GET", "/groups", Some("Group"), ResponseMedia::default()),
                operation("PUT", "/", Some("Domain"), ResponseMedia::default()),
                operation("GET", "/unTagged", None, ResponseMedia::default()),
            ],
        };

        let groups = group_by_tag(&api);
        let names: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Domain", "Group", "Api"]);
        assert_eq!(groups["Domain"].len(), 2);
    }

    #[test]
    fn test_variant_suffixes_dual_media() {
        let op = operation(
            "GET",
            "/datasets/{id}/value",
            None,
            ResponseMedia {
                json: true,
                stream: true,
            },
        );
        let variants = variant_suffixes(&op);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].suffix, "AsJson");
        assert_eq!(variants[1].suffix, "AsStream");
    }

    #[test]
    fn test_variant_suffixes_single_media() {
        let op = operation(
            "GET",
            "/",
            None,
            ResponseMedia {
                json: true,
                stream: false,
            },
        );
        let variants = variant_suffixes(&op);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].suffix, "");
    }

    #[test]
    fn test_default_settings_resolve_hsds_names() {
        let settings = Settings::default();
        let name = (settings.operation_name)("GET", "/groups/{id}/links").unwrap();
        assert_eq!(name, "Links");
    }
}
