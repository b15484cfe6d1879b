#![deny(missing_docs)]

//! # OpenAPI Document Parsing
//!
//! The downstream parser for the corrected document. Deserializes the YAML
//! into shim structures, validates the root, and flattens the path items
//! into a list of operations the generators consume.

pub mod routes;
pub mod shims;
pub mod validation;

use crate::error::{AppError, AppResult};
use crate::oas::shims::ShimOpenApi;
pub use routes::{
    OperationParameter, ParamLocation, ParamType, ParsedOperation, ResponseMedia,
};

/// Parsed document metadata plus flattened operation records.
#[derive(Debug)]
pub struct ParsedApi {
    /// API title from the `info` object.
    pub title: String,
    /// API version string from the `info` object.
    pub version: String,
    /// Optional API description.
    pub description: Option<String>,
    /// Flattened operations in declaration order.
    pub operations: Vec<ParsedOperation>,
}

/// Parses a corrected OpenAPI document into metadata and operations.
///
/// Rejects documents that do not declare OpenAPI 3.0.x; the raw upstream
/// HSDS document must be run through the patcher first.
pub fn parse_api_document(yaml_content: &str) -> AppResult<ParsedApi> {
    let shim: ShimOpenApi = serde_yaml::from_str(yaml_content)
        .map_err(|e| AppError::General(format!("Failed to parse OpenAPI YAML: {}", e)))?;

    validation::validate_api_root(&shim)?;

    let operations = routes::flatten_operations(&shim)?;

    let info = shim
        .info
        .ok_or_else(|| AppError::General("OpenAPI document missing 'info' object".into()))?;

    log::debug!(
        "Parsed '{}' v{}: {} operations",
        info.title,
        info.version,
        operations.len()
    );

    Ok(ParsedApi {
        title: info.title,
        version: info.version,
        description: info.description,
        operations,
    })
}
