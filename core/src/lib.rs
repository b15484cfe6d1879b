#![deny(missing_docs)]

//! # Apigen Core
//!
//! Core library for the HSDS OpenAPI client generator. The pipeline is:
//! patch the raw upstream document, parse the corrected document, resolve
//! operation names from the fixed table, and emit one client source file
//! per target language.

/// Shared error types.
pub mod error;

/// Upstream document correction.
pub mod patcher;

/// OpenAPI document parsing.
pub mod oas;

/// Operation name resolution table.
pub mod naming;

/// Per-language client emission.
pub mod generator;

pub use error::{AppError, AppResult};
pub use generator::csharp::CSharpGenerator;
pub use generator::python::PythonGenerator;
pub use generator::{ClientGenerator, OperationNameResolver, Settings};
pub use naming::resolve_operation_name;
pub use oas::{parse_api_document, ParsedApi, ParsedOperation};
pub use patcher::patch_document;
