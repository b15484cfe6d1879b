#![deny(missing_docs)]

//! # Python Client Emission
//!
//! Renders a single `.py` module containing the exception type, sync and
//! async sub-clients per tag, and the two root clients carrying the `httpx`
//! invocation plumbing. Method bodies build the relative URL by template
//! substitution and percent-encoded query assembly, mirroring the C# output.

use crate::error::{AppError, AppResult};
use crate::generator::{
    accept_header, group_by_tag, variant_suffixes, ClientGenerator, MethodVariant, Settings,
    VariantBody,
};
use crate::oas::{OperationParameter, ParamLocation, ParamType, ParsedApi, ParsedOperation};
use heck::{ToSnakeCase, ToUpperCamelCase};

/// Emits the Python client.
pub struct PythonGenerator;

impl ClientGenerator for PythonGenerator {
    fn language(&self) -> &'static str {
        "python"
    }

    fn file_name(&self, settings: &Settings) -> String {
        format!("{}.py", settings.client_name.to_snake_case())
    }

    fn generate(&self, api: &ParsedApi, settings: &Settings) -> AppResult<String> {
        let mut code = String::new();

        code.push_str(&emit_module_header(api, settings));
        code.push_str(&emit_shared(settings));

        let groups = group_by_tag(api);

        for (tag, ops) in &groups {
            code.push_str(&emit_sub_client(tag, ops, settings, false)?);
            code.push_str(&emit_sub_client(tag, ops, settings, true)?);
        }

        code.push_str(&emit_root_client(groups.keys(), settings, false));
        code.push_str(&emit_root_client(groups.keys(), settings, true));

        log::debug!("Emitted Python client ({} tags)", groups.len());

        Ok(code)
    }
}

fn emit_module_header(api: &ParsedApi, settings: &Settings) -> String {
    let base64_import = if settings.nexus_features {
        "import base64\n"
    } else {
        ""
    };

    format!(
        "\
# <auto-generated>
#     This code was generated by hsds-apigen from the {title} v{version}
#     OpenAPI document. Changes to this file will be lost if the code is
#     regenerated.
# </auto-generated>

# Python <= 3.9
from __future__ import annotations

{base64_import}import json
from typing import Any, Awaitable, Optional
from urllib.parse import quote

from httpx import AsyncClient, Client, Request, Response


def _to_string(value: Any) -> str:

    if type(value) is str:
        return value

    else:
        return str(value)


",
        title = api.title,
        version = api.version,
        base64_import = base64_import,
    )
}

fn emit_shared(settings: &Settings) -> String {
    format!(
        "\
class {exception}(Exception):
    \"\"\"A {exception}.\"\"\"

    def __init__(self, status_code: str, message: str):
        self.status_code = status_code
        self.message = message

    status_code: str
    \"\"\"The exception status code.\"\"\"

    message: str
    \"\"\"The exception message.\"\"\"


",
        exception = settings.exception_type,
    )
}

fn emit_sub_client(
    tag: &str,
    ops: &[&ParsedOperation],
    settings: &Settings,
    sync: bool,
) -> AppResult<String> {
    let class_name = sub_client_name(tag, sync);
    let root = root_client_name(settings, sync);
    let mut code = String::new();

    code.push_str(&format!(
        "\
class {class_name}:
    \"\"\"Provides methods to interact with {subject}.\"\"\"

    ___client: {root}

    def __init__(self, client: {root}):
        self.___client = client
",
        class_name = class_name,
        subject = tag.to_lowercase(),
        root = root,
    ));

    for op in ops {
        for variant in variant_suffixes(op) {
            code.push('\n');
            code.push_str(&emit_method(op, variant, settings, sync)?);
        }
    }

    code.push_str("\n\n");

    Ok(code)
}

fn emit_method(
    op: &ParsedOperation,
    variant: MethodVariant,
    settings: &Settings,
    sync: bool,
) -> AppResult<String> {
    let name = (settings.operation_name)(&op.method, &op.path)?;
    let verb = op.method.to_lowercase().to_upper_camel_case();
    let method_name = format!("{}{}{}", verb, name, variant.suffix).to_snake_case();

    let (required, optional) = ordered_parameters(op)?;

    // Signature
    let mut arguments = vec!["self".to_string()];
    for param in &required {
        arguments.push(format!(
            "{}: {}",
            parameter_ident(&param.name),
            python_type(param.param_type)
        ));
    }
    if op.has_body && op.body_required {
        arguments.push("body: object".to_string());
    }
    for param in &optional {
        arguments.push(format!(
            "{}: Optional[{}] = None",
            parameter_ident(&param.name),
            python_type(param.param_type)
        ));
    }
    if op.has_body && !op.body_required {
        arguments.push("body: Optional[object] = None".to_string());
    }

    let mut code = String::new();

    code.push_str(&format!(
        "    def {}({}) -> {}:\n",
        method_name,
        arguments.join(", "),
        annotation(variant.body, sync)
    ));

    // Docstring
    code.push_str("        \"\"\"\n");
    let summary = op.summary.as_deref().unwrap_or(name);
    code.push_str(&format!("        {}\n", summary.trim()));
    let documented: Vec<&&OperationParameter> = required
        .iter()
        .chain(optional.iter())
        .filter(|p| p.description.is_some())
        .collect();
    if !documented.is_empty() {
        code.push_str("\n        Args:\n");
        for param in documented {
            code.push_str(&format!(
                "            {}: {}\n",
                parameter_ident(&param.name),
                param.description.as_deref().unwrap_or_default().trim()
            ));
        }
    }
    code.push_str("        \"\"\"\n\n");

    // URL building
    code.push_str(&format!("        __url = \"{}\"\n", op.path));
    for param in required
        .iter()
        .filter(|p| p.location == ParamLocation::Path)
    {
        code.push_str(&format!(
            "        __url = __url.replace(\"{{{name}}}\", quote(str({ident}), safe=\"\"))\n",
            name = param.name,
            ident = parameter_ident(&param.name),
        ));
    }

    // Query string assembly
    let has_query = required
        .iter()
        .chain(optional.iter())
        .any(|p| p.location == ParamLocation::Query);

    if has_query {
        code.push_str("\n        __query_values: dict[str, str] = {}\n");
        for param in required
            .iter()
            .filter(|p| p.location == ParamLocation::Query)
        {
            code.push_str(&format!(
                "\n        __query_values[\"{name}\"] = quote(_to_string({ident}), safe=\"\")\n",
                name = param.name,
                ident = parameter_ident(&param.name),
            ));
        }
        for param in optional
            .iter()
            .filter(|p| p.location == ParamLocation::Query)
        {
            code.push_str(&format!(
                "\n        if {ident} is not None:\n            __query_values[\"{name}\"] = quote(_to_string({ident}), safe=\"\")\n",
                name = param.name,
                ident = parameter_ident(&param.name),
            ));
        }
        code.push_str(
            "\n        if __query_values:\n            __url += \"?\" + \"&\".join(f\"{key}={value}\" for (key, value) in __query_values.items())\n",
        );
    }

    // Invoke
    let type_marker = match variant.body {
        VariantBody::Json => "Any",
        VariantBody::Stream => "Response",
        VariantBody::None => "None",
    };
    let accept = match accept_header(variant.body) {
        Some(value) => format!("\"{}\"", value),
        None => "None".to_string(),
    };
    let (content_type, content) = if op.has_body {
        if op.body_required {
            ("\"application/json\"", "json.dumps(body)")
        } else {
            (
                "\"application/json\"",
                "None if body is None else json.dumps(body)",
            )
        }
    } else {
        ("None", "None")
    };

    code.push_str(&format!(
        "\n        return self.___client._invoke({marker}, \"{method}\", __url, {accept}, {content_type}, {content})\n",
        marker = type_marker,
        method = op.method,
        accept = accept,
        content_type = content_type,
        content = content,
    ));

    Ok(code)
}

fn emit_root_client<'a>(
    tags: impl Iterator<Item = &'a String>,
    settings: &Settings,
    sync: bool,
) -> String {
    let tags: Vec<&String> = tags.collect();
    let root = root_client_name(settings, sync);
    let http_client = if sync { "Client" } else { "AsyncClient" };
    let subject = settings.client_name.trim_end_matches("Client");
    let mut code = String::new();

    code.push_str(&format!(
        "\
class {root}:
    \"\"\"A client for the {subject} system.\"\"\"

    _http_client: {http_client}

    @classmethod
    def create(cls, base_url: str) -> {root}:
        \"\"\"
        Initializes a new instance of the {root}

            Args:
                base_url: The base URL to use.
        \"\"\"
        return {root}({http_client}(base_url=base_url, timeout=60.0))

    def __init__(self, http_client: {http_client}):
        \"\"\"
        Initializes a new instance of the {root}

            Args:
                http_client: The HTTP client to use.
        \"\"\"

        if http_client.base_url is None:
            raise Exception(\"The base url of the HTTP client must be set.\")

        self._http_client = http_client

",
        root = root,
        subject = subject,
        http_client = http_client,
    ));

    for tag in &tags {
        code.push_str(&format!(
            "        self._{field} = {class_name}(self)\n",
            field = tag.to_snake_case(),
            class_name = sub_client_name(tag, sync),
        ));
    }

    for tag in &tags {
        code.push_str(&format!(
            "\n    @property\n    def {field}(self) -> {class_name}:\n        \"\"\"Gets the {class_name}.\"\"\"\n        return self._{field}\n",
            field = tag.to_snake_case(),
            class_name = sub_client_name(tag, sync),
        ));
    }

    if settings.refresh_token_support {
        code.push_str(&emit_token_support());
    }

    if settings.nexus_features {
        code.push_str(&emit_configuration_support());
    }

    code.push_str(&emit_invoke(settings, sync));

    if sync {
        code.push_str(
            "
    # \"disposable\" methods
    def __enter__(self):
        return self

    def __exit__(self, exc_type, exc_value, exc_traceback):
        if self._http_client is not None:
            self._http_client.close()


",
        );
    } else {
        code.push_str(
            "
    # \"disposable\" methods
    async def __aenter__(self):
        return self

    async def __aexit__(self, exc_type, exc_value, exc_traceback):
        if self._http_client is not None:
            await self._http_client.aclose()


",
        );
    }

    code
}

fn emit_token_support() -> String {
    "
    def sign_in(self, access_token: str, refresh_token: str):
        \"\"\"
        Signs in the user with a token pair.

            Args:
                access_token: The access token.
                refresh_token: The refresh token.
        \"\"\"

        self._access_token = access_token
        self._refresh_token = refresh_token
        self._http_client.headers[\"Authorization\"] = f\"Bearer {access_token}\"
"
    .to_string()
}

fn emit_configuration_support() -> String {
    "
    def attach_configuration(self, configuration: Any):
        \"\"\"Attaches configuration data to subsequent API requests.\"\"\"

        encoded_json = base64.b64encode(json.dumps(configuration).encode(\"utf-8\")).decode(\"utf-8\")
        self._http_client.headers[\"Nexus-Configuration\"] = encoded_json

    def clear_configuration(self):
        \"\"\"Clears configuration data for all subsequent API requests.\"\"\"

        self._http_client.headers.pop(\"Nexus-Configuration\", None)
"
    .to_string()
}

fn emit_invoke(settings: &Settings, sync: bool) -> String {
    let (def, await_send, await_close) = if sync {
        ("    def _invoke", "", "")
    } else {
        ("    async def _invoke", "await ", "await ")
    };
    let close = if sync { "close" } else { "aclose" };

    format!(
        "
{def}(self, typeOfT, method: str, relative_url: str, accept_header_value: Optional[str], content_type_value: Optional[str], content) -> Any:

        # prepare request
        request = self._build_request_message(method, relative_url, content, content_type_value, accept_header_value)

        # send request
        response = {await_send}self._http_client.send(request)

        # process response
        if not response.is_success:

            message = response.text
            status_code = f\"{prefix}00.{{response.status_code}}\"

            if not message:
                raise {exception}(status_code, f\"The HTTP request failed with status code {{response.status_code}}.\")

            else:
                raise {exception}(status_code, f\"The HTTP request failed with status code {{response.status_code}}. The response message is: {{message}}\")

        try:

            if typeOfT is None:
                return None

            elif typeOfT is Response:
                return response

            else:

                try:
                    return json.loads(response.text)

                except json.JSONDecodeError:
                    raise {exception}(\"{prefix}01\", \"Response data could not be deserialized.\")

        finally:
            if typeOfT is not Response:
                {await_close}response.{close}()

    def _build_request_message(self, method: str, relative_url: str, content, content_type_value: Optional[str], accept_header_value: Optional[str]) -> Request:

        request_message = self._http_client.build_request(method, relative_url, content=content)

        if content_type_value is not None:
            request_message.headers[\"Content-Type\"] = content_type_value

        if accept_header_value is not None:
            request_message.headers[\"Accept\"] = accept_header_value

        return request_message
",
        def = def,
        await_send = await_send,
        await_close = await_close,
        close = close,
        prefix = settings.exception_code_prefix,
        exception = settings.exception_type,
    )
}

// --- Helpers ---

fn parameter_ident(name: &str) -> String {
    name.to_snake_case()
}

fn sub_client_name(tag: &str, sync: bool) -> String {
    if sync {
        format!("{}Client", tag.to_upper_camel_case())
    } else {
        format!("{}AsyncClient", tag.to_upper_camel_case())
    }
}

fn root_client_name(settings: &Settings, sync: bool) -> String {
    if sync {
        settings.client_name.clone()
    } else {
        format!(
            "{}AsyncClient",
            settings.client_name.trim_end_matches("Client")
        )
    }
}

/// Splits parameters into required and optional groups, preserving document
/// order within each group. Header parameters are not supported.
fn ordered_parameters(
    op: &ParsedOperation,
) -> AppResult<(Vec<&OperationParameter>, Vec<&OperationParameter>)> {
    if let Some(header) = op
        .parameters
        .iter()
        .find(|p| p.location == ParamLocation::Header)
    {
        return Err(AppError::General(format!(
            "Parameter '{}' of {} {}: header parameters are not supported by the Python emitter",
            header.name, op.method, op.path
        )));
    }

    let required = op.parameters.iter().filter(|p| p.required).collect();
    let optional = op.parameters.iter().filter(|p| !p.required).collect();

    Ok((required, optional))
}

fn python_type(param_type: ParamType) -> &'static str {
    match param_type {
        ParamType::String => "str",
        ParamType::Number => "float",
        ParamType::Integer => "int",
        ParamType::Boolean => "bool",
    }
}

fn annotation(body: VariantBody, sync: bool) -> String {
    let inner = match body {
        VariantBody::Json => "Any",
        VariantBody::Stream => "Response",
        VariantBody::None => "None",
    };

    if sync {
        inner.to_string()
    } else {
        format!("Awaitable[{}]", inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::parse_api_document;

    const FIXTURE: &str = r#"
openapi: 3.0.3
info:
  title: HSDS REST API
  version: "2.0"
paths:
  /groups/{id}/links:
    parameters:
      - name: id
        in: path
        required: true
        description: UUID of the group.
        schema: {type: string}
    get:
      tags: [Link]
      summary: List all links of a group.
      parameters:
        - name: domain
          in: query
          required: true
          description: Domain on service to access.
          schema: {type: string}
        - name: Limit
          in: query
          schema: {type: number}
      responses:
        "200":
          description: ok
          content:
            application/json: {}
  /datasets/{id}/value:
    parameters:
      - name: id
        in: path
        required: true
        schema: {type: string}
    get:
      tags: [Dataset]
      responses:
        "200":
          description: ok
          content:
            application/json: {}
            application/octet-stream: {}
    put:
      tags: [Dataset]
      requestBody:
        required: true
        content:
          application/json: {}
      responses:
        "200": {description: ok}
"#;

    fn generate(settings: &Settings) -> String {
        let api = parse_api_document(FIXTURE).unwrap();
        PythonGenerator.generate(&api, settings).unwrap()
    }

    #[test]
    fn test_emits_exception_and_roots() {
        let code = generate(&Settings::default());
        assert!(code.contains("class HsdsException(Exception):"));
        assert!(code.contains("class HsdsClient:"));
        assert!(code.contains("class HsdsAsyncClient:"));
        assert!(code.contains("f\"H00.{response.status_code}\""));
        assert!(code.contains("\"H01\""));
    }

    #[test]
    fn test_emits_sync_and_async_sub_clients() {
        let code = generate(&Settings::default());
        assert!(code.contains("class LinkClient:"));
        assert!(code.contains("class LinkAsyncClient:"));
        assert!(code.contains(
            "def get_links(self, id: str, domain: str, limit: Optional[float] = None) -> Any:"
        ));
        assert!(code.contains(
            "def get_links(self, id: str, domain: str, limit: Optional[float] = None) -> Awaitable[Any]:"
        ));
    }

    #[test]
    fn test_dual_media_emits_two_variants() {
        let code = generate(&Settings::default());
        assert!(code.contains("def get_values_as_json("));
        assert!(code.contains("def get_values_as_stream("));
        assert!(code.contains("-> Response:"));
    }

    #[test]
    fn test_url_building_and_invoke() {
        let code = generate(&Settings::default());
        assert!(code.contains("__url = \"/groups/{id}/links\""));
        assert!(code.contains("__url = __url.replace(\"{id}\", quote(str(id), safe=\"\"))"));
        assert!(code.contains("__query_values[\"domain\"] = quote(_to_string(domain), safe=\"\")"));
        assert!(code.contains(
            "return self.___client._invoke(Any, \"GET\", __url, \"application/json\", None, None)"
        ));
    }

    #[test]
    fn test_body_operation_serializes_json() {
        let code = generate(&Settings::default());
        assert!(code.contains("def put_values(self, id: str, body: object) -> None:"));
        assert!(code.contains("json.dumps(body)"));
    }

    #[test]
    fn test_feature_flags_gate_optional_sections() {
        let plain = generate(&Settings::default());
        assert!(!plain.contains("def sign_in("));
        assert!(!plain.contains("Nexus-Configuration"));
        assert!(!plain.contains("import base64"));

        let flagged = generate(&Settings {
            refresh_token_support: true,
            nexus_features: true,
            ..Settings::default()
        });
        assert!(flagged.contains("def sign_in(self, access_token: str, refresh_token: str):"));
        assert!(flagged.contains("def attach_configuration(self, configuration: Any):"));
        assert!(flagged.contains("import base64"));
    }

    #[test]
    fn test_file_name_is_snake_case() {
        assert_eq!(
            PythonGenerator.file_name(&Settings::default()),
            "hsds_client.py"
        );
    }
}
