#![deny(missing_docs)]

//! # Document Validation
//!
//! Root-level structural checks applied before route flattening. The parser
//! deliberately supports only OpenAPI 3.0.x: the upstream HSDS document
//! declares 3.1.0 and must go through the patcher first.

use crate::error::{AppError, AppResult};
use crate::oas::shims::ShimOpenApi;

/// Validates required root-level fields for an OpenAPI document.
pub(crate) fn validate_api_root(api: &ShimOpenApi) -> AppResult<()> {
    let version = api.openapi.as_deref().ok_or_else(|| {
        AppError::General("OpenAPI document missing required 'openapi' version field".into())
    })?;

    if !version.starts_with("3.0") {
        return Err(AppError::General(format!(
            "OpenAPI version '{}' is not supported (expected 3.0.x)",
            version
        )));
    }

    let info = api.info.as_ref().ok_or_else(|| {
        AppError::General("OpenAPI document missing required 'info' object".into())
    })?;

    if info.title.trim().is_empty() {
        return Err(AppError::General(
            "Info.title must be a non-empty string".into(),
        ));
    }

    if info.version.trim().is_empty() {
        return Err(AppError::General(
            "Info.version must be a non-empty string".into(),
        ));
    }

    if api.paths.is_empty() {
        return Err(AppError::General(
            "OpenAPI document must define at least one path".into(),
        ));
    }

    for path in api.paths.keys() {
        if !path.starts_with('/') {
            return Err(AppError::General(format!(
                "Path item key '{}' must start with '/'",
                path
            )));
        }
    }

    Ok(())
}
