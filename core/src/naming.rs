#![deny(missing_docs)]

//! # Operation Name Resolution
//!
//! The upstream HSDS document carries no usable operation identifiers, so
//! generated method names come from a fixed table keyed by HTTP method and
//! path template. Lookup is method-specific first, then path-only; a miss on
//! both means the table is out of sync with the upstream document and must
//! be treated as a configuration error.

use crate::error::{AppError, AppResult};

/// Entries that need the HTTP method to disambiguate, e.g. `POST /groups`
/// creates one group while `GET /groups` lists them all.
const METHOD_PATH_NAMES: &[(&str, &str, &str)] = &[
    ("POST", "/groups", "Group"),
    ("GET", "/groups", "Groups"),
    ("POST", "/datasets", "Dataset"),
    ("GET", "/datasets", "Datasets"),
];

/// Entries shared by every method on the path.
const PATH_NAMES: &[(&str, &str)] = &[
    ("/", "Domain"),
    ("/datatypes", "DataType"),
    ("/groups/{id}", "Group"),
    ("/groups/{id}/links", "Links"),
    ("/groups/{id}/links/{linkname}", "Link"),
    ("/groups/{id}/acls", "GroupAccessLists"),
    ("/groups/{id}/acls/{user}", "GroupUserAccess"),
    ("/datasets/{id}", "Dataset"),
    ("/datasets/{id}/shape", "Shape"),
    ("/datasets/{id}/type", "DataType"),
    ("/datasets/{id}/value", "Values"),
    ("/datasets/{id}/acls", "DatasetAccessLists"),
    ("/datatypes/{id}", "Datatype"),
    ("/datatypes/{id}/acls", "DataTypeAccessLists"),
    ("/acls", "AccessLists"),
    ("/acls/{user}", "UserAccess"),
    ("/{collection}/{obj_uuid}/attributes", "Attributes"),
    ("/{collection}/{obj_uuid}/attributes/{attr}", "Attribute"),
];

/// Resolves the operation name for a `(method, path)` pair.
///
/// # Errors
///
/// Returns [`AppError::Naming`] when neither a method-specific nor a
/// path-only entry exists.
pub fn resolve_operation_name(method: &str, path: &str) -> AppResult<&'static str> {
    let method = method.to_uppercase();

    if let Some((_, _, name)) = METHOD_PATH_NAMES
        .iter()
        .find(|(m, p, _)| *m == method && *p == path)
    {
        return Ok(name);
    }

    if let Some((_, name)) = PATH_NAMES.iter().find(|(p, _)| *p == path) {
        return Ok(name);
    }

    Err(AppError::Naming(format!(
        "No operation name for {} {}: the resolution table is out of sync with the upstream document",
        method, path
    )))
}
