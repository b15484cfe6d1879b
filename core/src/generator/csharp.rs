#![deny(missing_docs)]

//! # C# Client Emission
//!
//! Renders a single `.g.cs` source file: the exception type, one sub-client
//! per tag, and the root client carrying the HTTP invocation plumbing. The
//! emitted code is async-only and targets `System.Text.Json` and
//! `System.Net.Http` from the base class library.

use crate::error::{AppError, AppResult};
use crate::generator::{
    accept_header, group_by_tag, variant_suffixes, ClientGenerator, MethodVariant, Settings,
    VariantBody,
};
use crate::oas::{OperationParameter, ParamLocation, ParamType, ParsedApi, ParsedOperation};
use heck::{ToLowerCamelCase, ToUpperCamelCase};

/// Emits the C# client.
pub struct CSharpGenerator;

impl ClientGenerator for CSharpGenerator {
    fn language(&self) -> &'static str {
        "csharp"
    }

    fn file_name(&self, settings: &Settings) -> String {
        format!("{}.g.cs", settings.client_name)
    }

    fn generate(&self, api: &ParsedApi, settings: &Settings) -> AppResult<String> {
        let mut code = String::new();

        code.push_str(&emit_header(api, settings));
        code.push_str(&emit_exception(settings));

        let groups = group_by_tag(api);

        for (tag, ops) in &groups {
            code.push_str(&emit_sub_client(tag, ops, settings)?);
        }

        code.push_str(&emit_root_client(groups.keys(), settings));

        if settings.nexus_features {
            code.push_str(&emit_disposable_configuration(settings));
        }

        log::debug!("Emitted C# client ({} tags)", groups.len());

        Ok(code)
    }
}

fn emit_header(api: &ParsedApi, settings: &Settings) -> String {
    format!(
        "\
// <auto-generated>
//     This code was generated by hsds-apigen from the {title} v{version}
//     OpenAPI document. Changes to this file will be lost if the code is
//     regenerated.
// </auto-generated>

#nullable enable

using System;
using System.Collections.Generic;
using System.Globalization;
using System.Linq;
using System.Net.Http;
using System.Net.Http.Headers;
using System.Text;
using System.Text.Json;
using System.Threading;
using System.Threading.Tasks;

namespace {namespace};

",
        title = api.title,
        version = api.version,
        namespace = settings.namespace,
    )
}

fn emit_exception(settings: &Settings) -> String {
    format!(
        "\
/// <summary>A {exception}.</summary>
public class {exception} : Exception
{{
    internal {exception}(string statusCode, string message) : base(message)
    {{
        StatusCode = statusCode;
    }}

    /// <summary>The exception status code.</summary>
    public string StatusCode {{ get; }}
}}

",
        exception = settings.exception_type,
    )
}

fn emit_sub_client(
    tag: &str,
    ops: &[&ParsedOperation],
    settings: &Settings,
) -> AppResult<String> {
    let class_name = sub_client_name(tag);
    let mut code = String::new();

    code.push_str(&format!(
        "\
/// <summary>Provides methods to interact with {subject}.</summary>
public class {class_name}
{{
    private readonly {client} ___client;

    internal {class_name}({client} client)
    {{
        ___client = client;
    }}
",
        subject = tag.to_lowercase(),
        class_name = class_name,
        client = settings.client_name,
    ));

    for op in ops {
        for variant in variant_suffixes(op) {
            code.push('\n');
            code.push_str(&emit_method(op, variant, settings)?);
        }
    }

    code.push_str("}\n\n");

    Ok(code)
}

fn emit_method(
    op: &ParsedOperation,
    variant: MethodVariant,
    settings: &Settings,
) -> AppResult<String> {
    let name = (settings.operation_name)(&op.method, &op.path)?;
    let verb = op.method.to_lowercase().to_upper_camel_case();
    let method_name = format!("{}{}{}Async", verb, name, variant.suffix);

    let (required, optional) = ordered_parameters(op)?;

    let mut code = String::new();

    // Doc comment
    code.push_str("    /// <summary>\n");
    let summary = op.summary.as_deref().unwrap_or(name);
    code.push_str(&format!("    /// {}\n", summary.trim()));
    code.push_str("    /// </summary>\n");
    for param in required.iter().chain(optional.iter()) {
        if let Some(description) = &param.description {
            code.push_str(&format!(
                "    /// <param name=\"{}\">{}</param>\n",
                parameter_ident(&param.name),
                description.trim()
            ));
        }
    }
    code.push_str(
        "    /// <param name=\"cancellationToken\">The token to cancel the current operation.</param>\n",
    );

    // Signature
    let mut arguments = Vec::new();
    for param in &required {
        arguments.push(format!(
            "{} {}",
            csharp_type(param.param_type, true),
            parameter_ident(&param.name)
        ));
    }
    if op.has_body && op.body_required {
        arguments.push("JsonElement body".to_string());
    }
    for param in &optional {
        arguments.push(format!(
            "{} {} = default",
            csharp_type(param.param_type, false),
            parameter_ident(&param.name)
        ));
    }
    if op.has_body && !op.body_required {
        arguments.push("JsonElement? body = default".to_string());
    }
    arguments.push("CancellationToken cancellationToken = default".to_string());

    code.push_str(&format!(
        "    public {} {}({})\n    {{\n",
        return_type(variant.body),
        method_name,
        arguments.join(", ")
    ));

    // URL building
    code.push_str("        var __urlBuilder = new StringBuilder();\n");
    code.push_str(&format!(
        "        __urlBuilder.Append(\"{}\");\n",
        op.path
    ));
    for param in required
        .iter()
        .filter(|p| p.location == ParamLocation::Path)
    {
        code.push_str(&format!(
            "        __urlBuilder.Replace(\"{{{name}}}\", Uri.EscapeDataString(Convert.ToString({ident}, CultureInfo.InvariantCulture)!));\n",
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
        code.push_str("\n        var __queryValues = new Dictionary<string, string>();\n");
        for param in required
            .iter()
            .filter(|p| p.location == ParamLocation::Query)
        {
            code.push_str(&format!(
                "\n        __queryValues[\"{name}\"] = Uri.EscapeDataString(Convert.ToString({ident}, CultureInfo.InvariantCulture)!);\n",
                name = param.name,
                ident = parameter_ident(&param.name),
            ));
        }
        for param in optional
            .iter()
            .filter(|p| p.location == ParamLocation::Query)
        {
            code.push_str(&format!(
                "\n        if ({ident} is not null)\n            __queryValues[\"{name}\"] = Uri.EscapeDataString(Convert.ToString({ident}, CultureInfo.InvariantCulture)!);\n",
                name = param.name,
                ident = parameter_ident(&param.name),
            ));
        }
        code.push_str(
            "\n        if (__queryValues.Any())\n        {\n            __urlBuilder.Append('?');\n            __urlBuilder.Append(string.Join('&', __queryValues.Select(entry => $\"{entry.Key}={entry.Value}\")));\n        }\n",
        );
    }

    code.push_str("\n        var __url = __urlBuilder.ToString();\n");

    // Request body
    let content_expr = if op.has_body {
        if op.body_required {
            code.push_str(
                "        var __content = new StringContent(JsonSerializer.Serialize(body));\n",
            );
        } else {
            code.push_str(
                "        var __content = body is null ? default(HttpContent) : new StringContent(JsonSerializer.Serialize(body));\n",
            );
        }
        "__content"
    } else {
        "default"
    };

    let accept = match accept_header(variant.body) {
        Some(value) => format!("\"{}\"", value),
        None => "default".to_string(),
    };
    let content_type = if op.has_body {
        "\"application/json\""
    } else {
        "default"
    };

    code.push_str(&format!(
        "        return ___client.InvokeAsync<{generic}>(\"{method}\", __url, {accept}, {content_type}, {content}, cancellationToken);\n",
        generic = invoke_generic(variant.body),
        method = op.method,
        accept = accept,
        content_type = content_type,
        content = content_expr,
    ));

    code.push_str("    }\n");

    Ok(code)
}

fn emit_root_client<'a>(tags: impl Iterator<Item = &'a String>, settings: &Settings) -> String {
    let tags: Vec<&String> = tags.collect();
    let mut code = String::new();

    code.push_str(&format!(
        "\
/// <summary>A client for the {subject} system.</summary>
public class {client} : IDisposable
{{
    private readonly HttpClient _httpClient;

",
        subject = settings.client_name.trim_end_matches("Client"),
        client = settings.client_name,
    ));

    // Constructors
    if settings.wasm_support {
        // Browser hosts own the connection lifetime; no explicit timeout.
        code.push_str(&format!(
            "\
    /// <summary>Initializes a new instance of the {client}.</summary>
    /// <param name=\"baseUrl\">The base URL to use.</param>
    public {client}(Uri baseUrl) : this(new HttpClient() {{ BaseAddress = baseUrl }})
    {{
    }}

",
            client = settings.client_name,
        ));
    } else {
        code.push_str(&format!(
            "\
    /// <summary>Initializes a new instance of the {client}.</summary>
    /// <param name=\"baseUrl\">The base URL to use.</param>
    public {client}(Uri baseUrl) : this(
        new HttpClient()
        {{
            BaseAddress = baseUrl,
            Timeout = TimeSpan.FromSeconds(60)
        }})
    {{
    }}

",
            client = settings.client_name,
        ));
    }

    code.push_str(&format!(
        "\
    /// <summary>Initializes a new instance of the {client}.</summary>
    /// <param name=\"httpClient\">The HTTP client to use.</param>
    public {client}(HttpClient httpClient)
    {{
        if (httpClient.BaseAddress is null)
            throw new Exception(\"The base address of the HTTP client must be set.\");

        _httpClient = httpClient;

",
        client = settings.client_name,
    ));

    for tag in &tags {
        code.push_str(&format!(
            "        {property} = new {class_name}(this);\n",
            property = tag.to_upper_camel_case(),
            class_name = sub_client_name(tag),
        ));
    }
    code.push_str("    }\n");

    for tag in &tags {
        code.push_str(&format!(
            "\n    /// <summary>Gets the {class_name}.</summary>\n    public {class_name} {property} {{ get; }}\n",
            class_name = sub_client_name(tag),
            property = tag.to_upper_camel_case(),
        ));
    }

    if settings.refresh_token_support {
        code.push_str(&emit_token_support());
    }

    if settings.nexus_features {
        code.push_str(&emit_configuration_support());
    }

    code.push_str(&emit_invoke(settings));

    code.push_str(
        "
    /// <summary>Disposes the underlying HTTP client.</summary>
    public void Dispose() => _httpClient.Dispose();
}
",
    );

    code
}

fn emit_token_support() -> String {
    "
    private string? _accessToken;
    private string? _refreshToken;

    /// <summary>Signs in the user with a token pair.</summary>
    /// <param name=\"accessToken\">The access token.</param>
    /// <param name=\"refreshToken\">The refresh token.</param>
    public void SignIn(string accessToken, string refreshToken)
    {
        _accessToken = accessToken;
        _refreshToken = refreshToken;

        _httpClient.DefaultRequestHeaders.Authorization
            = new AuthenticationHeaderValue(\"Bearer\", accessToken);
    }
"
    .to_string()
}

fn emit_configuration_support() -> String {
    "
    private const string ConfigurationHeaderKey = \"Nexus-Configuration\";

    /// <summary>Attaches configuration data to subsequent API requests.</summary>
    /// <param name=\"configuration\">The configuration data.</param>
    public IDisposable AttachConfiguration(object configuration)
    {
        var encodedJson = Convert.ToBase64String(JsonSerializer.SerializeToUtf8Bytes(configuration));

        _httpClient.DefaultRequestHeaders.Remove(ConfigurationHeaderKey);
        _httpClient.DefaultRequestHeaders.Add(ConfigurationHeaderKey, encodedJson);

        return new DisposableConfiguration(this);
    }

    /// <summary>Clears configuration data for all subsequent API requests.</summary>
    public void ClearConfiguration()
    {
        _httpClient.DefaultRequestHeaders.Remove(ConfigurationHeaderKey);
    }
"
    .to_string()
}

fn emit_invoke(settings: &Settings) -> String {
    let send = if settings.wasm_support {
        // HttpCompletionOption is not honored by the browser fetch backend.
        "await _httpClient.SendAsync(requestMessage, cancellationToken).ConfigureAwait(false)"
    } else {
        "await _httpClient.SendAsync(requestMessage, HttpCompletionOption.ResponseHeadersRead, cancellationToken).ConfigureAwait(false)"
    };

    format!(
        "
    internal async Task<T> InvokeAsync<T>(string method, string relativeUrl, string? acceptHeaderValue, string? contentTypeValue, HttpContent? content, CancellationToken cancellationToken)
    {{
        using var requestMessage = BuildRequestMessage(method, relativeUrl, content, contentTypeValue, acceptHeaderValue);

        var response = {send};

        if (!response.IsSuccessStatusCode)
        {{
            var message = await response.Content.ReadAsStringAsync(cancellationToken).ConfigureAwait(false);
            var statusCode = $\"{prefix}00.{{(int)response.StatusCode}}\";

            response.Dispose();

            if (string.IsNullOrWhiteSpace(message))
                throw new {exception}(statusCode, $\"The HTTP request failed with status code {{(int)response.StatusCode}}.\");

            throw new {exception}(statusCode, $\"The HTTP request failed with status code {{(int)response.StatusCode}}. The response message is: {{message}}\");
        }}

        try
        {{
            if (typeof(T) == typeof(object))
                return default!;

            if (typeof(T) == typeof(HttpResponseMessage))
                return (T)(object)response;

            var stream = await response.Content.ReadAsStreamAsync(cancellationToken).ConfigureAwait(false);

            try
            {{
                var returnValue = await JsonSerializer.DeserializeAsync<T>(stream, cancellationToken: cancellationToken).ConfigureAwait(false);

                if (returnValue is null)
                    throw new {exception}(\"{prefix}01\", \"Response data could not be deserialized.\");

                return returnValue;
            }}
            catch (JsonException)
            {{
                throw new {exception}(\"{prefix}01\", \"Response data could not be deserialized.\");
            }}
        }}
        finally
        {{
            if (typeof(T) != typeof(HttpResponseMessage))
                response.Dispose();
        }}
    }}

    private HttpRequestMessage BuildRequestMessage(string method, string relativeUrl, HttpContent? content, string? contentTypeValue, string? acceptHeaderValue)
    {{
        var requestMessage = new HttpRequestMessage()
        {{
            Method = new HttpMethod(method),
            RequestUri = new Uri(relativeUrl, UriKind.Relative),
            Content = content
        }};

        if (content is not null && contentTypeValue is not null)
            requestMessage.Content!.Headers.ContentType = MediaTypeHeaderValue.Parse(contentTypeValue);

        if (acceptHeaderValue is not null)
            requestMessage.Headers.Accept.Add(MediaTypeWithQualityHeaderValue.Parse(acceptHeaderValue));

        return requestMessage;
    }}
",
        send = send,
        prefix = settings.exception_code_prefix,
        exception = settings.exception_type,
    )
}

fn emit_disposable_configuration(settings: &Settings) -> String {
    format!(
        "
internal class DisposableConfiguration : IDisposable
{{
    private readonly {client} _client;

    public DisposableConfiguration({client} client)
    {{
        _client = client;
    }}

    public void Dispose() => _client.ClearConfiguration();
}}
",
        client = settings.client_name,
    )
}

// --- Helpers ---

fn sub_client_name(tag: &str) -> String {
    format!("{}Client", tag.to_upper_camel_case())
}

fn parameter_ident(name: &str) -> String {
    name.to_lower_camel_case()
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
            "Parameter '{}' of {} {}: header parameters are not supported by the C# emitter",
            header.name, op.method, op.path
        )));
    }

    let required = op.parameters.iter().filter(|p| p.required).collect();
    let optional = op.parameters.iter().filter(|p| !p.required).collect();

    Ok((required, optional))
}

fn csharp_type(param_type: ParamType, required: bool) -> &'static str {
    match (param_type, required) {
        (ParamType::String, true) => "string",
        (ParamType::String, false) => "string?",
        (ParamType::Number, true) => "double",
        (ParamType::Number, false) => "double?",
        (ParamType::Integer, true) => "int",
        (ParamType::Integer, false) => "int?",
        (ParamType::Boolean, true) => "bool",
        (ParamType::Boolean, false) => "bool?",
    }
}

fn return_type(body: VariantBody) -> &'static str {
    match body {
        VariantBody::Json => "Task<JsonElement>",
        VariantBody::Stream => "Task<HttpResponseMessage>",
        VariantBody::None => "Task",
    }
}

fn invoke_generic(body: VariantBody) -> &'static str {
    match body {
        VariantBody::Json => "JsonElement",
        VariantBody::Stream => "HttpResponseMessage",
        VariantBody::None => "object",
    }
}
