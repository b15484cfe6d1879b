#![deny(missing_docs)]

//! # Specification Patcher
//!
//! Repairs known defects in the upstream HSDS OpenAPI document before it is
//! handed to the parser:
//!
//! 1. The declared OpenAPI version is downgraded to one the downstream
//!    parser accepts.
//! 2. Missing schema definitions (hrefs, shapes, types, layouts, attributes)
//!    and the empty response bodies of the dataset and attribute endpoints
//!    are installed as named-key patches on the parsed document tree.
//!
//! Patching is structural: every target is located by key, so the transform
//! is independent of upstream line numbers. When a target's parent node is
//! absent the patch fails with [`AppError::Patch`] rather than landing
//! somewhere wrong.

pub mod fragments;
pub mod structural;
pub mod version;

use crate::error::{AppError, AppResult};
use serde_yaml::Value;

/// Produces the corrected document for a raw upstream OpenAPI text.
///
/// The output is deterministic: a given input always serializes to the same
/// bytes. The patcher does not validate its own output; the downstream
/// parser is the gate for well-formedness.
pub fn patch_document(document: &str) -> AppResult<String> {
    let downgraded = version::downgrade_version(document);

    let mut root: Value = serde_yaml::from_str(&downgraded).map_err(|e| {
        AppError::Patch(format!("Upstream document is not parseable YAML: {}", e))
    })?;

    if !root.is_mapping() {
        return Err(AppError::Patch(
            "Upstream document root is not a mapping".into(),
        ));
    }

    for patch in fragments::PATCHES {
        structural::apply(&mut root, patch)?;
        log::debug!("Applied patch at '{}'", patch.target.join("."));
    }

    serde_yaml::to_string(&root)
        .map_err(|e| AppError::Patch(format!("Failed to serialize patched document: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL_UPSTREAM: &str = r#"
openapi: 3.1.0
info:
  title: HSDS REST API
  version: 2.0.0
components:
  schemas:
    ACL:
      type: object
paths:
  /datasets/{id}:
    get:
      responses:
        "200":
          description: placeholder
  /{collection}/{obj_uuid}/attributes:
    get:
      responses:
        "200":
          description: placeholder
  /{collection}/{obj_uuid}/attributes/{attr}:
    get:
      responses:
        "200":
          description: placeholder
"#;

    #[test]
    fn test_patch_downgrades_version() {
        let out = patch_document(MINIMAL_UPSTREAM).unwrap();
        assert!(out.contains("3.0.3"));
        assert!(!out.contains("3.1.0"));
    }

    #[test]
    fn test_patch_installs_all_schemas() {
        let out = patch_document(MINIMAL_UPSTREAM).unwrap();
        for name in [
            "HrefType",
            "ShapeType",
            "TypeType",
            "TypeTypeFieldsType",
            "LayoutType",
            "AttributeType",
        ] {
            assert!(out.contains(name), "Missing schema '{}'", name);
        }
        // Pre-existing upstream schema survives
        assert!(out.contains("ACL"));
    }

    #[test]
    fn test_patch_is_deterministic() {
        let first = patch_document(MINIMAL_UPSTREAM).unwrap();
        let second = patch_document(MINIMAL_UPSTREAM).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_patched_output_round_trips() {
        // Patching an already patched document must not duplicate keys.
        let once = patch_document(MINIMAL_UPSTREAM).unwrap();
        let twice = patch_document(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_schemas_land_inside_components_block() {
        let out = patch_document(MINIMAL_UPSTREAM).unwrap();
        let schemas_at = out.find("schemas:").expect("schemas block present");
        let paths_at = out.find("paths:").expect("paths block present");
        let shape_at = out.find("ShapeType:").expect("ShapeType present");
        assert!(schemas_at < shape_at && shape_at < paths_at);
    }

    #[test]
    fn test_dataset_response_replaced() {
        let out = patch_document(MINIMAL_UPSTREAM).unwrap();
        let root: Value = serde_yaml::from_str(&out).unwrap();
        let response = &root["paths"]["/datasets/{id}"]["get"]["responses"]["200"];
        assert_eq!(
            response
                .get("description")
                .and_then(|d| d.as_str()),
            Some("The dataset metadata.")
        );
        assert!(response["content"]["application/json"]["schema"]
            .get("properties")
            .is_some());
    }

    #[test]
    fn test_truncated_upstream_fails_loudly() {
        // Without the attribute endpoints the response patches must refuse
        // to apply instead of inventing path entries.
        let truncated = r#"
openapi: 3.1.0
info:
  title: HSDS REST API
  version: 2.0.0
components:
  schemas: {}
paths:
  /datasets/{id}:
    get:
      responses:
        "200":
          description: placeholder
"#;
        let err = patch_document(truncated).unwrap_err();
        assert!(matches!(err, AppError::Patch(_)));
    }

    #[test]
    fn test_non_yaml_input_rejected() {
        let err = patch_document("\t{ not yaml: [").unwrap_err();
        assert!(matches!(err, AppError::Patch(_)));
    }
}
