#![deny(missing_docs)]

//! # Structural Patch Application
//!
//! Applies named-key patches to a parsed YAML document tree. Targets are
//! resolved by key, never by line offset, so a reshuffled upstream document
//! either patches correctly or fails loudly.

use crate::error::{AppError, AppResult};
use crate::patcher::fragments::Patch;
use serde_yaml::{Mapping, Value};

/// Applies one patch to the document tree, overwriting the target node if it
/// already exists and inserting it otherwise.
///
/// Intermediate nodes must be mappings. A missing intermediate node is only
/// created when the patch allows it; otherwise it is reported as upstream
/// drift.
pub fn apply(root: &mut Value, patch: &Patch) -> AppResult<()> {
    let display = patch.target.join(".");

    let replacement: Value = serde_yaml::from_str(patch.fragment).map_err(|e| {
        AppError::Patch(format!("Fragment for '{}' is not valid YAML: {}", display, e))
    })?;

    let (leaf, parents) = patch
        .target
        .split_last()
        .ok_or_else(|| AppError::Patch("Patch target is empty".into()))?;

    let mut node = root;

    for segment in parents {
        let map = node.as_mapping_mut().ok_or_else(|| {
            AppError::Patch(format!(
                "Node '{}' is not a mapping while patching '{}'",
                segment, display
            ))
        })?;

        let key = key_for(map, segment);

        if !map.contains_key(&key) {
            if patch.create_missing_parents {
                map.insert(key.clone(), Value::Mapping(Mapping::new()));
            } else {
                return Err(AppError::Patch(format!(
                    "Missing node '{}' while patching '{}': the upstream document has drifted",
                    segment, display
                )));
            }
        }

        node = map.get_mut(&key).ok_or_else(|| {
            AppError::Patch(format!(
                "Failed to descend into '{}' while patching '{}'",
                segment, display
            ))
        })?;
    }

    let map = node.as_mapping_mut().ok_or_else(|| {
        AppError::Patch(format!(
            "Parent of '{}' is not a mapping while patching '{}'",
            leaf, display
        ))
    })?;

    let key = key_for(map, leaf);
    map.insert(key, replacement);

    Ok(())
}

/// Chooses the mapping key matching a target segment.
///
/// YAML response maps frequently carry unquoted status codes (`200:`), which
/// parse as numbers. When the mapping already holds a numeric form of the
/// segment we address that key, otherwise the plain string.
fn key_for(map: &Mapping, segment: &str) -> Value {
    if let Ok(number) = segment.parse::<u64>() {
        let numeric = Value::Number(number.into());
        if map.contains_key(&numeric) {
            return numeric;
        }
    }

    Value::String(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(target: &'static [&'static str], fragment: &'static str, create: bool) -> Patch {
        Patch {
            target,
            fragment,
            create_missing_parents: create,
        }
    }

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).expect("test yaml parses")
    }

    #[test]
    fn test_insert_new_key() {
        let mut root = parse("components:\n  schemas:\n    Existing:\n      type: string\n");
        let p = patch(
            &["components", "schemas", "Added"],
            "type: object\n",
            true,
        );
        apply(&mut root, &p).unwrap();

        let added = &root["components"]["schemas"]["Added"];
        assert_eq!(added.get("type").and_then(|t| t.as_str()), Some("object"));
        // Pre-existing siblings survive
        assert!(root["components"]["schemas"].get("Existing").is_some());
    }

    #[test]
    fn test_overwrite_existing_key() {
        let mut root = parse("components:\n  schemas:\n    Broken:\n      type: string\n");
        let p = patch(
            &["components", "schemas", "Broken"],
            "type: object\n",
            true,
        );
        apply(&mut root, &p).unwrap();

        let fixed = &root["components"]["schemas"]["Broken"];
        assert_eq!(fixed.get("type").and_then(|t| t.as_str()), Some("object"));
    }

    #[test]
    fn test_creates_missing_component_containers() {
        let mut root = parse("openapi: 3.0.3\n");
        let p = patch(
            &["components", "schemas", "Added"],
            "type: object\n",
            true,
        );
        apply(&mut root, &p).unwrap();
        assert!(root["components"]["schemas"].get("Added").is_some());
    }

    #[test]
    fn test_missing_parent_is_drift() {
        let mut root = parse("paths:\n  /other:\n    get:\n      responses: {}\n");
        let p = patch(
            &["paths", "/datasets/{id}", "get", "responses", "200"],
            "description: ok\n",
            false,
        );
        let err = apply(&mut root, &p).unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("drifted"), "unexpected message: {}", msg);
    }

    #[test]
    fn test_numeric_response_keys_are_addressed() {
        // Unquoted `200:` parses as a number; the patch must hit that key
        // instead of inserting a second, string-keyed `"200"` entry.
        let mut root = parse("paths:\n  /d:\n    get:\n      responses:\n        200:\n          description: old\n");
        let p = patch(
            &["paths", "/d", "get", "responses", "200"],
            "description: new\n",
            false,
        );
        apply(&mut root, &p).unwrap();

        let responses = root["paths"]["/d"]["get"]["responses"]
            .as_mapping()
            .unwrap();
        assert_eq!(responses.len(), 1);
        let only = responses.values().next().unwrap();
        assert_eq!(only.get("description").and_then(|d| d.as_str()), Some("new"));
    }

    #[test]
    fn test_invalid_fragment_is_reported() {
        let mut root = parse("components: {}\n");
        let p = patch(&["components", "X"], ": not yaml: [", true);
        let err = apply(&mut root, &p).unwrap_err();
        assert!(format!("{}", err).contains("not valid YAML"));
    }
}
