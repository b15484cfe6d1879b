#![deny(missing_docs)]

//! # Document Shims
//!
//! Generic structures acting as an Intermediate Deserialization Layer.
//! These structs map directly to OpenAPI YAML objects; fields the generator
//! has no use for are simply not declared and ignored during parsing.

use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};

/// Root of an OpenAPI document.
#[derive(Debug, Deserialize)]
pub struct ShimOpenApi {
    /// Declared OpenAPI version token.
    pub openapi: Option<String>,
    /// Document metadata.
    pub info: Option<ShimInfo>,
    /// Path items keyed by path template.
    #[serde(default)]
    pub paths: IndexMap<String, ShimPathItem>,
    /// Raw `components` object; schemas are passed through untouched.
    pub components: Option<serde_json::Value>,
}

/// The `info` object.
#[derive(Debug, Deserialize)]
pub struct ShimInfo {
    /// API title.
    pub title: String,
    /// API version string.
    pub version: String,
    /// Optional API description.
    pub description: Option<String>,
}

/// One path template with its operations.
#[derive(Debug, Default, Deserialize)]
pub struct ShimPathItem {
    /// GET operation, if declared.
    pub get: Option<ShimOperation>,
    /// PUT operation, if declared.
    pub put: Option<ShimOperation>,
    /// POST operation, if declared.
    pub post: Option<ShimOperation>,
    /// DELETE operation, if declared.
    pub delete: Option<ShimOperation>,
    /// Parameters shared by every operation of the path item.
    #[serde(default)]
    pub parameters: Vec<ShimParameter>,
}

/// One HTTP operation.
#[derive(Debug, Deserialize)]
pub struct ShimOperation {
    /// Short operation summary.
    pub summary: Option<String>,
    /// Longer operation description.
    pub description: Option<String>,
    /// Grouping tags; the first one selects the sub-client.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Upstream operation identifier, when present.
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<ShimParameter>,
    /// Request body definition.
    #[serde(rename = "requestBody")]
    pub request_body: Option<ShimRequestBody>,
    /// Response map keyed by status code.
    #[serde(default)]
    pub responses: ShimResponses,
}

/// A path, query or header parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct ShimParameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location (`path`, `query`, `header`).
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter is required.
    #[serde(default)]
    pub required: bool,
    /// Parameter description.
    pub description: Option<String>,
    /// Declared schema.
    pub schema: Option<ShimSchema>,
}

/// The slice of a schema object the generator cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct ShimSchema {
    /// Primitive schema type (`string`, `number`, `integer`, `boolean`).
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
}

/// A request body definition.
#[derive(Debug, Deserialize)]
pub struct ShimRequestBody {
    /// Whether the body is required.
    #[serde(default)]
    pub required: bool,
    /// Media types of the body.
    #[serde(default)]
    pub content: IndexMap<String, serde_json::Value>,
}

/// A single response entry.
#[derive(Debug, Deserialize)]
pub struct ShimResponse {
    /// Response description.
    pub description: Option<String>,
    /// Media types of the response body.
    #[serde(default)]
    pub content: IndexMap<String, serde_json::Value>,
}

/// Response map keyed by status code.
///
/// YAML permits unquoted status keys (`200:`), which parse as numbers; keys
/// are normalized to strings here so the rest of the crate never has to care.
#[derive(Debug, Default)]
pub struct ShimResponses(pub IndexMap<String, ShimResponse>);

impl<'de> Deserialize<'de> for ShimResponses {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<serde_yaml::Value, ShimResponse>::deserialize(deserializer)?;
        let mut normalized = IndexMap::with_capacity(raw.len());

        for (key, value) in raw {
            let key = match key {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                other => {
                    return Err(DeError::custom(format!(
                        "Response key {:?} must be a status code or 'default'",
                        other
                    )))
                }
            };
            normalized.insert(key, value);
        }

        Ok(Self(normalized))
    }
}
