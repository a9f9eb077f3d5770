//! Built-in components available to every content page.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use serde_json::Value;
use tracing::warn;

use super::{Component, Props, RenderContext};
use crate::markdown;
use crate::openapi::render::render_api_page;
use crate::openapi::{Method, OperationRef};

type ComponentFn = fn(&Props, &str, &RenderContext<'_>) -> Result<String>;

const DEFAULTS: &[(&str, ComponentFn)] = &[
    ("Callout", callout),
    ("Card", card),
    ("Cards", cards),
    ("Tabs", tabs),
    ("Tab", tab),
    ("Accordions", accordions),
    ("Accordion", accordion),
    ("Steps", steps),
    ("Step", step),
    ("Files", files),
    ("Folder", folder),
    ("File", file),
    ("APIPage", api_page),
];

/// The default component table.
pub fn default_components() -> HashMap<String, Arc<dyn Component>> {
    DEFAULTS
        .iter()
        .map(|&(name, f)| (name.to_string(), Arc::new(f) as Arc<dyn Component>))
        .collect()
}

fn icon_html(props: &Props, ctx: &RenderContext<'_>) -> String {
    props
        .get_str("icon")
        .map(|name| name.trim_matches(|c| c == '<' || c == '>' || c == '/' || c == ' '))
        .and_then(|name| ctx.icons.resolve(name))
        .map(|icon| icon.to_svg())
        .unwrap_or_default()
}

fn callout(props: &Props, children: &str, _ctx: &RenderContext<'_>) -> Result<String> {
    let kind = match props.get_str("type").unwrap_or("info") {
        "warn" | "warning" => "warn",
        "error" => "error",
        "success" => "success",
        _ => "info",
    };
    let title = props
        .get_str("title")
        .map(|t| format!("<p class=\"callout-title\">{}</p>", text(t)))
        .unwrap_or_default();
    Ok(format!(
        "<div class=\"callout callout-{}\" role=\"note\">{}<div class=\"callout-body\">{}</div></div>",
        kind, title, children
    ))
}

fn card(props: &Props, children: &str, ctx: &RenderContext<'_>) -> Result<String> {
    let title = text(props.get_str("title").unwrap_or("")).to_string();
    let description = props
        .get_str("description")
        .map(|d| format!("<p>{}</p>", text(d)))
        .unwrap_or_default();
    let inner = format!(
        "{}<h3 class=\"card-title\">{}</h3>{}{}",
        icon_html(props, ctx),
        title,
        description,
        children
    );

    Ok(match props.get_str("href") {
        Some(href) => format!("<a class=\"card\" href=\"{}\">{}</a>", attr(href), inner),
        None => format!("<div class=\"card\">{}</div>", inner),
    })
}

fn cards(_props: &Props, children: &str, _ctx: &RenderContext<'_>) -> Result<String> {
    Ok(format!("<div class=\"cards\">{}</div>", children))
}

fn tabs(props: &Props, children: &str, _ctx: &RenderContext<'_>) -> Result<String> {
    let buttons: String = props
        .get_str_list("items")
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            format!(
                "<button type=\"button\" role=\"tab\" data-tab=\"{}\" aria-selected=\"{}\">{}</button>",
                attr(item),
                idx == 0,
                text(item)
            )
        })
        .collect();
    Ok(format!(
        "<div class=\"tabs\"><div class=\"tab-list\" role=\"tablist\">{}</div>{}</div>",
        buttons, children
    ))
}

fn tab(props: &Props, children: &str, _ctx: &RenderContext<'_>) -> Result<String> {
    let value = props.get_str("value").or_else(|| props.get_str("title")).unwrap_or("");
    Ok(format!(
        "<div class=\"tab-panel\" role=\"tabpanel\" data-value=\"{}\">{}</div>",
        attr(value),
        children
    ))
}

fn accordions(_props: &Props, children: &str, _ctx: &RenderContext<'_>) -> Result<String> {
    Ok(format!("<div class=\"accordions\">{}</div>", children))
}

fn accordion(props: &Props, children: &str, _ctx: &RenderContext<'_>) -> Result<String> {
    let title = props.get_str("title").unwrap_or("");
    let id = props
        .get_str("id")
        .map(str::to_string)
        .unwrap_or_else(|| markdown::slug(title));
    Ok(format!(
        "<details class=\"accordion\" id=\"{}\"><summary>{}</summary><div class=\"accordion-body\">{}</div></details>",
        attr(&id),
        text(title),
        children
    ))
}

fn steps(_props: &Props, children: &str, _ctx: &RenderContext<'_>) -> Result<String> {
    Ok(format!("<div class=\"steps\">{}</div>", children))
}

fn step(_props: &Props, children: &str, _ctx: &RenderContext<'_>) -> Result<String> {
    Ok(format!("<div class=\"step\">{}</div>", children))
}

fn files(_props: &Props, children: &str, _ctx: &RenderContext<'_>) -> Result<String> {
    Ok(format!("<ul class=\"files\">{}</ul>", children))
}

fn folder(props: &Props, children: &str, _ctx: &RenderContext<'_>) -> Result<String> {
    let open = if props.get_bool("defaultOpen") { " open" } else { "" };
    Ok(format!(
        "<li class=\"folder\"><details{}><summary>{}</summary><ul>{}</ul></details></li>",
        open,
        text(props.get_str("name").unwrap_or("")),
        children
    ))
}

fn file(props: &Props, _children: &str, _ctx: &RenderContext<'_>) -> Result<String> {
    Ok(format!(
        "<li class=\"file\">{}</li>",
        text(props.get_str("name").unwrap_or(""))
    ))
}

fn error_callout(message: &str) -> String {
    format!(
        "<div class=\"callout callout-error\" role=\"alert\"><div class=\"callout-body\"><p>{}</p></div></div>",
        text(message)
    )
}

/// `<APIPage document={...} operations={[{path, method}]} hasHead={bool} />`
///
/// A missing document or operation renders an error notice in place so one
/// bad reference does not take the whole page down.
fn api_page(props: &Props, _children: &str, ctx: &RenderContext<'_>) -> Result<String> {
    let document = match props.get_str("document") {
        Some(name) => ctx.openapi.get(name),
        None => ctx.openapi.single(),
    };
    let Some(doc) = document else {
        let name = props.get_str("document").unwrap_or("<unspecified>");
        warn!("APIPage references unknown OpenAPI document {}", name);
        return Ok(error_callout(&format!("OpenAPI document {} is not available.", name)));
    };

    let mut operations: Vec<OperationRef<'_>> = Vec::new();
    let requested = props.get("operations").and_then(Value::as_array);
    match requested {
        Some(items) => {
            for item in items {
                let path = item.get("path").and_then(Value::as_str).unwrap_or("");
                let method = item.get("method").and_then(Value::as_str).and_then(Method::parse);
                match method.and_then(|m| doc.find_operation(path, m)) {
                    Some(op) => operations.push(op),
                    None => {
                        warn!("APIPage references unknown operation {} {}", item, path);
                        return Ok(error_callout(&format!("Operation {} is not defined.", item)));
                    }
                }
            }
        }
        None => operations = doc.operations(),
    }

    Ok(render_api_page(doc, &operations, props.get_bool("hasHead")))
}
