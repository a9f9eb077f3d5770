//! HTML reference blocks for OpenAPI operations.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use serde_json::Value;

use super::{OpenApiDocument, OperationRef};
use crate::markdown;

/// Nested schema levels shown before collapsing to the type name.
const MAX_SCHEMA_DEPTH: usize = 6;

/// Render the reference block for `operations`.
///
/// With `has_head` each operation gets its own `<h2>` title; otherwise the
/// page title is assumed to name the operation.
pub fn render_api_page(doc: &OpenApiDocument, operations: &[OperationRef<'_>], has_head: bool) -> String {
    let mut html = String::from("<div class=\"api-page\">");
    for op in operations {
        render_operation(&mut html, doc, op, has_head);
    }
    html.push_str("</div>");
    html
}

fn render_operation(html: &mut String, doc: &OpenApiDocument, op: &OperationRef<'_>, has_head: bool) {
    let method = op.method.as_str();
    let _ = write!(
        html,
        "<section class=\"api-operation\" id=\"{}-{}\">",
        method,
        attr(&markdown::slug(op.path))
    );

    if has_head {
        let _ = write!(html, "<h2>{}</h2>", text(&op.title()));
    }
    if op.operation.deprecated {
        html.push_str("<p class=\"api-deprecated\">Deprecated</p>");
    }

    let server = doc.servers.first().map(|s| s.url.trim_end_matches('/')).unwrap_or("");
    let _ = write!(
        html,
        "<div class=\"api-endpoint\"><span class=\"api-method api-method-{}\">{}</span>\
         <code>{}{}</code></div>",
        method,
        op.method,
        text(server),
        text(op.path)
    );

    if let Some(description) = op.description() {
        let _ = write!(
            html,
            "<div class=\"api-description\">{}</div>",
            markdown::to_html(description)
        );
    }

    render_parameters(html, doc, op);
    render_request_body(html, doc, op);
    render_responses(html, doc, op);
    render_curl(html, server, op);

    html.push_str("</section>");
}

fn render_parameters(html: &mut String, doc: &OpenApiDocument, op: &OperationRef<'_>) {
    let params = doc.parameters(op);
    if params.is_empty() {
        return;
    }

    html.push_str(
        "<h3>Parameters</h3><table class=\"api-params\"><thead><tr>\
         <th>Name</th><th>In</th><th>Type</th><th>Description</th></tr></thead><tbody>",
    );
    for param in params {
        let ty = param
            .schema
            .as_ref()
            .map(|s| type_name(doc, s))
            .unwrap_or_default();
        let _ = write!(
            html,
            "<tr><td><code>{}</code>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            text(&param.name),
            if param.required { " <span class=\"api-required\">*</span>" } else { "" },
            text(&param.location),
            text(&ty),
            text(param.description.as_deref().unwrap_or(""))
        );
    }
    html.push_str("</tbody></table>");
}

fn render_request_body(html: &mut String, doc: &OpenApiDocument, op: &OperationRef<'_>) {
    let Some(body) = op.operation.request_body.as_ref().and_then(|b| doc.resolve(b)) else {
        return;
    };

    html.push_str("<h3>Request Body</h3>");
    if let Some(description) = &body.description {
        html.push_str(&markdown::to_html(description));
    }
    for (content_type, media) in &body.content {
        let _ = write!(html, "<p><code>{}</code>", text(content_type));
        if body.required {
            html.push_str(" <span class=\"api-required\">required</span>");
        }
        html.push_str("</p>");
        if let Some(schema) = &media.schema {
            render_schema(html, doc, schema, 0);
        }
    }
}

fn render_responses(html: &mut String, doc: &OpenApiDocument, op: &OperationRef<'_>) {
    if op.operation.responses.is_empty() {
        return;
    }

    html.push_str("<h3>Responses</h3><div class=\"api-responses\">");
    for (status, response) in &op.operation.responses {
        let Some(response) = doc.resolve(response) else {
            continue;
        };
        let _ = write!(
            html,
            "<div class=\"api-response\"><span class=\"api-status api-status-{}\">{}</span> {}",
            attr(status.get(..1).unwrap_or("x")),
            text(status),
            text(&response.description)
        );
        for (content_type, media) in &response.content {
            let _ = write!(html, "<p><code>{}</code></p>", text(content_type));
            if let Some(schema) = &media.schema {
                render_schema(html, doc, schema, 0);
            }
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
}

fn render_curl(html: &mut String, server: &str, op: &OperationRef<'_>) {
    let mut command = format!("curl -X {} \"{}{}\"", op.method, server, op.path);
    if op.operation.request_body.is_some() {
        command.push_str(" \\\n  -H \"Content-Type: application/json\" \\\n  -d '{}'");
    }
    let _ = write!(
        html,
        "<pre class=\"api-example\"><code class=\"language-bash\">{}</code></pre>",
        text(&command)
    );
}

/// Follow `$ref` chains to the inline schema.
fn deref<'a>(doc: &'a OpenApiDocument, mut schema: &'a Value) -> &'a Value {
    for _ in 0..MAX_SCHEMA_DEPTH {
        match schema.get("$ref").and_then(Value::as_str) {
            Some(reference) => match doc.resolve_pointer(reference) {
                Some(target) => schema = target,
                None => break,
            },
            None => break,
        }
    }
    schema
}

/// Short type label such as `string`, `array<User>` or `User`.
fn type_name(doc: &OpenApiDocument, schema: &Value) -> String {
    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        return reference.rsplit('/').next().unwrap_or(reference).to_string();
    }
    let schema = deref(doc, schema);
    match schema.get("type").and_then(Value::as_str) {
        Some("array") => {
            let item = schema.get("items").map(|i| type_name(doc, i)).unwrap_or_default();
            format!("array<{}>", item)
        }
        Some(ty) => match schema.get("format").and_then(Value::as_str) {
            Some(format) => format!("{} ({})", ty, format),
            None => ty.to_string(),
        },
        None if schema.get("properties").is_some() => "object".to_string(),
        None => String::new(),
    }
}

fn render_schema(html: &mut String, doc: &OpenApiDocument, schema: &Value, depth: usize) {
    let resolved = deref(doc, schema);
    let _ = write!(
        html,
        "<div class=\"api-schema\"><span class=\"api-type\">{}</span>",
        text(&type_name(doc, schema))
    );

    if depth < MAX_SCHEMA_DEPTH {
        if let Some(properties) = resolved.get("properties").and_then(Value::as_object) {
            let required: Vec<&str> = resolved
                .get("required")
                .and_then(Value::as_array)
                .map(|r| r.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            html.push_str("<ul class=\"api-properties\">");
            for (name, property) in properties {
                let _ = write!(html, "<li><code>{}</code>", text(name));
                if required.contains(&name.as_str()) {
                    html.push_str(" <span class=\"api-required\">*</span>");
                }
                if let Some(description) = deref(doc, property).get("description").and_then(Value::as_str) {
                    let _ = write!(html, " <span class=\"api-property-description\">{}</span>", text(description));
                }
                render_schema(html, doc, property, depth + 1);
                html.push_str("</li>");
            }
            html.push_str("</ul>");
        } else if let Some(items) = resolved.get("items") {
            if deref(doc, items).get("properties").is_some() {
                render_schema(html, doc, items, depth + 1);
            }
        }
    }
    html.push_str("</div>");
}
