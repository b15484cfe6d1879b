#![deny(missing_docs)]

//! # Operation Flattening
//!
//! Turns the shim document into a flat list of [`ParsedOperation`] records,
//! one per `(method, path)` pair, with parameters merged from the path item
//! and the operation.

use crate::error::{AppError, AppResult};
use crate::oas::shims::{ShimOpenApi, ShimOperation, ShimParameter, ShimPathItem};
use regex::Regex;

/// Where a parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// Substituted into the path template.
    Path,
    /// Appended to the query string.
    Query,
    /// Sent as a request header.
    Header,
}

/// Primitive parameter type declared by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// A string value.
    String,
    /// A floating point number.
    Number,
    /// An integer.
    Integer,
    /// A boolean flag.
    Boolean,
}

/// One resolved operation parameter.
#[derive(Debug, Clone)]
pub struct OperationParameter {
    /// Parameter name as declared upstream.
    pub name: String,
    /// Wire location.
    pub location: ParamLocation,
    /// Whether the caller must supply a value.
    pub required: bool,
    /// Upstream description, used for emitted doc comments.
    pub description: Option<String>,
    /// Declared primitive type.
    pub param_type: ParamType,
}

/// Media types declared by an operation's success response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseMedia {
    /// `application/json` is available.
    pub json: bool,
    /// `application/octet-stream` is available.
    pub stream: bool,
}

/// One flattened HTTP operation.
#[derive(Debug, Clone)]
pub struct ParsedOperation {
    /// Uppercase HTTP method.
    pub method: String,
    /// Path template, e.g. `/groups/{id}/links`.
    pub path: String,
    /// First grouping tag, when declared.
    pub tag: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Upstream operation identifier, when declared.
    pub operation_id: Option<String>,
    /// Merged parameters, path item first.
    pub parameters: Vec<OperationParameter>,
    /// Whether a request body is declared.
    pub has_body: bool,
    /// Whether the declared request body is required.
    pub body_required: bool,
    /// Success response media types.
    pub response: ResponseMedia,
}

/// Flattens every operation of the document, in declaration order.
pub(crate) fn flatten_operations(api: &ShimOpenApi) -> AppResult<Vec<ParsedOperation>> {
    let mut operations = Vec::new();

    for (path, item) in &api.paths {
        let methods: [(&str, &Option<ShimOperation>); 4] = [
            ("GET", &item.get),
            ("PUT", &item.put),
            ("POST", &item.post),
            ("DELETE", &item.delete),
        ];

        for (method, op) in methods {
            if let Some(op) = op {
                operations.push(build_operation(method, path, item, op)?);
            }
        }
    }

    Ok(operations)
}

fn build_operation(
    method: &str,
    path: &str,
    item: &ShimPathItem,
    op: &ShimOperation,
) -> AppResult<ParsedOperation> {
    let parameters = merge_parameters(method, path, item, op)?;
    validate_path_template(path, &parameters)?;

    let response = success_response_media(op);

    Ok(ParsedOperation {
        method: method.to_string(),
        path: path.to_string(),
        tag: op.tags.first().cloned(),
        summary: op.summary.clone(),
        description: op.description.clone(),
        operation_id: op.operation_id.clone(),
        parameters,
        has_body: op.request_body.is_some(),
        body_required: op.request_body.as_ref().is_some_and(|b| b.required),
        response,
    })
}

/// Merges path-item parameters with operation parameters. An operation-level
/// parameter replaces a path-item parameter of the same `(name, in)` pair.
fn merge_parameters(
    method: &str,
    path: &str,
    item: &ShimPathItem,
    op: &ShimOperation,
) -> AppResult<Vec<OperationParameter>> {
    let mut merged: Vec<&ShimParameter> = item.parameters.iter().collect();

    for param in &op.parameters {
        match merged
            .iter()
            .position(|p| p.name == param.name && p.location == param.location)
        {
            Some(idx) => merged[idx] = param,
            None => merged.push(param),
        }
    }

    merged
        .into_iter()
        .map(|p| convert_parameter(method, path, p))
        .collect()
}

fn convert_parameter(
    method: &str,
    path: &str,
    param: &ShimParameter,
) -> AppResult<OperationParameter> {
    let location = match param.location.as_str() {
        "path" => ParamLocation::Path,
        "query" => ParamLocation::Query,
        "header" => ParamLocation::Header,
        other => {
            return Err(AppError::General(format!(
                "Parameter '{}' of {} {} has unsupported location '{}'",
                param.name, method, path, other
            )))
        }
    };

    let param_type = match param
        .schema
        .as_ref()
        .and_then(|s| s.schema_type.as_deref())
    {
        None | Some("string") => ParamType::String,
        Some("number") => ParamType::Number,
        Some("integer") => ParamType::Integer,
        Some("boolean") => ParamType::Boolean,
        Some(other) => {
            return Err(AppError::General(format!(
                "Parameter '{}' of {} {} has unsupported type '{}'",
                param.name, method, path, other
            )))
        }
    };

    Ok(OperationParameter {
        name: param.name.clone(),
        location,
        // Path parameters are always required regardless of declaration.
        required: param.required || location == ParamLocation::Path,
        description: param.description.clone(),
        param_type,
    })
}

/// Every `{placeholder}` in the path template must be backed by a declared
/// path parameter.
fn validate_path_template(path: &str, parameters: &[OperationParameter]) -> AppResult<()> {
    let placeholder_re = Regex::new(r"\{([^}]+)}").expect("Invalid regex constant");

    for cap in placeholder_re.captures_iter(path) {
        let name = &cap[1];
        let declared = parameters
            .iter()
            .any(|p| p.location == ParamLocation::Path && p.name == name);
        if !declared {
            return Err(AppError::General(format!(
                "Path '{}' references undeclared path parameter '{}'",
                path, name
            )));
        }
    }

    Ok(())
}

/// Media types of the first success (2xx or default) response.
fn success_response_media(op: &ShimOperation) -> ResponseMedia {
    let success = op
        .responses
        .0
        .iter()
        .find(|(code, _)| code.starts_with('2'))
        .or_else(|| op.responses.0.get_key_value("default"))
        .map(|(_, response)| response);

    let Some(response) = success else {
        return ResponseMedia::default();
    };

    ResponseMedia {
        json: response.content.contains_key("application/json"),
        stream: response.content.contains_key("application/octet-stream"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(yaml: &str) -> AppResult<Vec<ParsedOperation>> {
        let api: ShimOpenApi = serde_yaml::from_str(yaml).expect("test yaml parses");
        flatten_operations(&api)
    }

    #[test]
    fn test_flatten_orders_by_declaration() {
        let ops = flatten(
            r#"
openapi: 3.0.3
info: {title: T, version: "1.0"}
paths:
  /groups:
    post:
      responses: {"201": {description: created}}
    get:
      responses: {"200": {description: ok}}
  /acls:
    get:
      responses: {"200": {description: ok}}
"#,
        )
        .unwrap();

        let pairs: Vec<(&str, &str)> = ops
            .iter()
            .map(|o| (o.method.as_str(), o.path.as_str()))
            .collect();
        // GET before POST within one path item, path items in document order
        assert_eq!(
            pairs,
            vec![("GET", "/groups"), ("POST", "/groups"), ("GET", "/acls")]
        );
    }

    #[test]
    fn test_path_item_parameters_are_inherited() {
        let ops = flatten(
            r#"
openapi: 3.0.3
info: {title: T, version: "1.0"}
paths:
  /groups/{id}:
    parameters:
      - name: id
        in: path
        required: true
        schema: {type: string}
    get:
      parameters:
        - name: domain
          in: query
          schema: {type: string}
      responses: {"200": {description: ok}}
"#,
        )
        .unwrap();

        let op = &ops[0];
        assert_eq!(op.parameters.len(), 2);
        assert_eq!(op.parameters[0].name, "id");
        assert_eq!(op.parameters[0].location, ParamLocation::Path);
        assert!(op.parameters[0].required);
        assert_eq!(op.parameters[1].name, "domain");
        assert!(!op.parameters[1].required);
    }

    #[test]
    fn test_operation_parameter_overrides_path_item() {
        let ops = flatten(
            r#"
openapi: 3.0.3
info: {title: T, version: "1.0"}
paths:
  /groups:
    parameters:
      - name: domain
        in: query
        schema: {type: string}
    get:
      parameters:
        - name: domain
          in: query
          required: true
          schema: {type: string}
      responses: {"200": {description: ok}}
"#,
        )
        .unwrap();

        let op = &ops[0];
        assert_eq!(op.parameters.len(), 1);
        assert!(op.parameters[0].required);
    }

    #[test]
    fn test_undeclared_path_parameter_rejected() {
        let err = flatten(
            r#"
openapi: 3.0.3
info: {title: T, version: "1.0"}
paths:
  /groups/{id}:
    get:
      responses: {"200": {description: ok}}
"#,
        )
        .unwrap_err();
        assert!(format!("{}", err).contains("undeclared path parameter 'id'"));
    }

    #[test]
    fn test_response_media_detection() {
        let ops = flatten(
            r#"
openapi: 3.0.3
info: {title: T, version: "1.0"}
paths:
  /datasets/{id}/value:
    parameters:
      - name: id
        in: path
        required: true
        schema: {type: string}
    get:
      responses:
        "200":
          description: ok
          content:
            application/json: {}
            application/octet-stream: {}
    put:
      requestBody:
        required: true
        content:
          application/json: {}
      responses:
        "200": {description: ok}
"#,
        )
        .unwrap();

        let get = ops.iter().find(|o| o.method == "GET").unwrap();
        assert!(get.response.json && get.response.stream);
        assert!(!get.has_body);

        let put = ops.iter().find(|o| o.method == "PUT").unwrap();
        assert!(put.has_body && put.body_required);
        assert!(!put.response.json && !put.response.stream);
    }

    #[test]
    fn test_unsupported_parameter_location_rejected() {
        let err = flatten(
            r#"
openapi: 3.0.3
info: {title: T, version: "1.0"}
paths:
  /groups:
    get:
      parameters:
        - name: session
          in: cookie
          schema: {type: string}
      responses: {"200": {description: ok}}
"#,
        )
        .unwrap_err();
        assert!(format!("{}", err).contains("unsupported location 'cookie'"));
    }
}
