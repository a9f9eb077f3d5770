//! MDX-style content rendering.
//!
//! Content files are Markdown with embedded component tags (`<Tabs>`,
//! `<Callout>`, `<APIPage />`, ...). Tags that start a line are expanded by
//! the matching [`Component`] from a [`ComponentRegistry`]; their children are
//! rendered recursively. Everything else goes through pulldown-cmark.

mod components;
mod props;

pub use components::default_components;
pub use props::{parse_open_tag, OpenTag, Props};

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use crate::i18n::Locale;
use crate::icons::IconResolver;
use crate::markdown::{self, RenderedMarkdown};
use crate::openapi::OpenApiRegistry;

/// Everything a component may consult while rendering.
pub struct RenderContext<'a> {
    pub locale: Locale,
    pub openapi: &'a OpenApiRegistry,
    pub icons: &'a dyn IconResolver,
}

/// Renders one component tag to HTML.
///
/// `children` is the already-rendered HTML of the tag's content.
pub trait Component: Send + Sync {
    fn render(&self, props: &Props, children: &str, ctx: &RenderContext<'_>) -> Result<String>;
}

impl<F> Component for F
where
    F: Fn(&Props, &str, &RenderContext<'_>) -> Result<String> + Send + Sync,
{
    fn render(&self, props: &Props, children: &str, ctx: &RenderContext<'_>) -> Result<String> {
        self(props, children, ctx)
    }
}

/// Tag name to component mapping used for every content page.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: HashMap<String, Arc<dyn Component>>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.components.keys().collect();
        names.sort();
        f.debug_struct("ComponentRegistry")
            .field("components", &names)
            .finish()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in components.
    pub fn with_defaults() -> Self {
        Self {
            components: default_components(),
        }
    }

    /// Merge caller-supplied components; an override replaces a default of
    /// the same name.
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, Arc<dyn Component>)>,
    {
        self.components.extend(overrides);
        self
    }

    pub fn register(&mut self, name: impl Into<String>, component: Arc<dyn Component>) {
        self.components.insert(name.into(), component);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Component>> {
        self.components.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Render a page body, returning HTML and the table of contents.
    pub fn render_page(&self, source: &str, ctx: &RenderContext<'_>) -> Result<RenderedMarkdown> {
        let cleaned = strip_mdx_syntax(source);
        let (markdown, blocks) = self.expand(&cleaned, ctx)?;
        let mut rendered = markdown::render(&markdown);
        rendered.html = substitute(rendered.html, &blocks);
        Ok(rendered)
    }

    /// Render a fragment to HTML.
    pub fn render_fragment(&self, source: &str, ctx: &RenderContext<'_>) -> Result<String> {
        let (markdown, blocks) = self.expand(&dedent(source), ctx)?;
        Ok(substitute(markdown::to_html(&markdown), &blocks))
    }

    /// Replace component tags with placeholders and render them.
    fn expand(&self, source: &str, ctx: &RenderContext<'_>) -> Result<(String, Vec<String>)> {
        let mut out = String::with_capacity(source.len());
        let mut blocks = Vec::new();
        let mut fence: Option<&str> = None;
        let mut pos = 0;

        while pos < source.len() {
            let line_end = source[pos..].find('\n').map_or(source.len(), |i| pos + i + 1);
            let line = &source[pos..line_end];
            let trimmed = line.trim_start();

            if let Some(marker) = fence {
                if trimmed.starts_with(marker) {
                    fence = None;
                }
                out.push_str(line);
                pos = line_end;
                continue;
            }
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                fence = Some(&trimmed[..3]);
                out.push_str(line);
                pos = line_end;
                continue;
            }

            let indent = line.len() - trimmed.len();
            let Some(tag) = parse_open_tag(&source[pos + indent..]) else {
                out.push_str(line);
                pos = line_end;
                continue;
            };

            let body_start = pos + indent + tag.len;
            let (children, next) = if tag.self_closing {
                ("", body_start)
            } else {
                match find_closing(&source[body_start..], &tag.name) {
                    Some((inner_len, close_len)) => (
                        &source[body_start..body_start + inner_len],
                        body_start + inner_len + close_len,
                    ),
                    None => {
                        debug!("Unclosed <{}> treated as self-closing", tag.name);
                        ("", body_start)
                    }
                }
            };

            let children_html = self.render_fragment(children, ctx)?;
            let html = match self.get(&tag.name) {
                Some(component) => component.render(&tag.props, &children_html, ctx)?,
                None => {
                    debug!("No component registered for <{}>", tag.name);
                    children_html
                }
            };

            // Keep the tag's indent so the block stays inside an enclosing list item
            out.push_str(&format!("\n{}<!--mdx-block-{}-->\n\n", &line[..indent], blocks.len()));
            blocks.push(html);

            // Text after the tag on the same line is still content
            pos = next;
        }

        Ok((out, blocks))
    }
}

/// Offset of the matching `</name>` within `input` and its length.
fn find_closing(input: &str, name: &str) -> Option<(usize, usize)> {
    let open = format!("<{}", name);
    let close = format!("</{}>", name);
    let mut depth = 0usize;
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];
        if rest.starts_with(&close) {
            if depth == 0 {
                return Some((pos, close.len()));
            }
            depth -= 1;
            pos += close.len();
        } else if rest.starts_with(&open)
            && rest[open.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/')
        {
            if let Some(tag) = parse_open_tag(rest) {
                if !tag.self_closing {
                    depth += 1;
                }
                pos += tag.len;
            } else {
                pos += open.len();
            }
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    None
}

fn substitute(mut html: String, blocks: &[String]) -> String {
    for (idx, block) in blocks.iter().enumerate().rev() {
        html = html.replace(&format!("<!--mdx-block-{}-->", idx), block);
    }
    html
}

/// Drop `import`/`export` statements and `{/* */}` comments.
fn strip_mdx_syntax(source: &str) -> String {
    static COMMENT: OnceLock<Regex> = OnceLock::new();
    let comment = COMMENT.get_or_init(|| Regex::new(r"(?s)\{/\*.*?\*/\}").expect("comment pattern is valid"));

    let without_comments = comment.replace_all(source, "");
    let mut fence = false;
    without_comments
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                fence = !fence;
            }
            fence || !(trimmed.starts_with("import ") || trimmed.starts_with("export "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn leading_indent(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Remove the space/tab indentation shared by all non-blank lines.
fn dedent(source: &str) -> String {
    let indent = source
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(leading_indent)
        .min()
        .unwrap_or(0);

    source
        .lines()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                l.get(indent..).unwrap_or(l)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::IconRegistry;

    fn render(registry: &ComponentRegistry, source: &str) -> RenderedMarkdown {
        let openapi = OpenApiRegistry::new();
        let icons = IconRegistry::builtin();
        let ctx = RenderContext {
            locale: Locale::En,
            openapi: &openapi,
            icons: &icons,
        };
        registry.render_page(source, &ctx).unwrap()
    }

    #[test]
    fn test_plain_markdown() {
        let rendered = render(&ComponentRegistry::with_defaults(), "## Hello\n\n*world*\n");
        assert!(rendered.html.contains("<em>world</em>"));
        assert_eq!(rendered.toc[0].id, "hello");
    }

    #[test]
    fn test_component_with_markdown_children() {
        let rendered = render(
            &ComponentRegistry::with_defaults(),
            "Intro\n\n<Callout type=\"warn\" title=\"Careful\">\n  Use **bold** here.\n</Callout>\n\nOutro\n",
        );

        assert!(rendered.html.contains("callout-warn"));
        assert!(rendered.html.contains("<strong>bold</strong>"));
        assert!(rendered.html.contains("<p>Outro</p>"));
        assert!(!rendered.html.contains("mdx-block"));
    }

    #[test]
    fn test_nested_components() {
        let source = "<Tabs items={['a', 'b']}>\n<Tab value=\"a\">\nFirst\n</Tab>\n<Tab value=\"b\">\nSecond\n</Tab>\n</Tabs>\n";
        let rendered = render(&ComponentRegistry::with_defaults(), source);

        assert!(rendered.html.contains("data-value=\"a\""));
        assert!(rendered.html.contains("<p>Second</p>"));
        assert_eq!(rendered.html.matches("class=\"tabs\"").count(), 1);
    }

    #[test]
    fn test_tags_inside_code_fences_are_literal() {
        let source = "```mdx\n<Callout>inside</Callout>\n```\n";
        let rendered = render(&ComponentRegistry::with_defaults(), source);

        assert!(rendered.html.contains("&lt;Callout&gt;inside&lt;/Callout&gt;"));
        assert!(!rendered.html.contains("class=\"callout"));
    }

    #[test]
    fn test_imports_and_comments_are_stripped() {
        let source = "import { X } from 'y';\n{/* generated */}\n\nText\n";
        let rendered = render(&ComponentRegistry::with_defaults(), source);

        assert!(!rendered.html.contains("import"));
        assert!(!rendered.html.contains("generated"));
        assert!(rendered.html.contains("<p>Text</p>"));
    }

    #[test]
    fn test_unknown_component_renders_children() {
        let rendered = render(&ComponentRegistry::new(), "<Mystery>\nhello\n</Mystery>\n");
        assert!(rendered.html.contains("<p>hello</p>"));
        assert!(!rendered.html.contains("Mystery"));
    }

    #[test]
    fn test_override_wins_on_collision() {
        let custom: Arc<dyn Component> =
            Arc::new(|_: &Props, children: &str, _: &RenderContext<'_>| -> Result<String> {
                Ok(format!("<aside class=\"custom\">{}</aside>", children))
            });
        let registry = ComponentRegistry::with_defaults()
            .with_overrides([("Callout".to_string(), custom)]);

        let rendered = render(&registry, "<Callout>\nnote\n</Callout>\n");

        assert!(rendered.html.contains("<aside class=\"custom\"><p>note</p>\n</aside>"));
        assert!(registry.contains("Tabs"));
    }

    #[test]
    fn test_find_closing_handles_nesting() {
        let input = "a<Tab>b</Tab>c</Tab>";
        assert_eq!(find_closing(input, "Tab"), Some((14, 6)));
        assert_eq!(find_closing("no close", "Tab"), None);
    }

    #[test]
    fn test_dedent() {
        assert_eq!(dedent("  a\n    b\n\n  c"), "a\n  b\n\nc");
    }

    #[test]
    fn test_dedent_only_strips_ascii_indent() {
        assert_eq!(dedent(" Note\n\u{a0}\n more"), "Note\n\nmore");
        assert_eq!(dedent("\u{a0}x\n  y"), "\u{a0}x\n  y");
    }

    #[test]
    fn test_non_breaking_space_line_inside_component() {
        let rendered = render(
            &ComponentRegistry::with_defaults(),
            "<Callout>\n Note\n\u{a0}\n more\n</Callout>\n",
        );

        assert!(rendered.html.contains("class=\"callout"));
        assert!(rendered.html.contains("<p>Note</p>"));
        assert!(rendered.html.contains("<p>more</p>"));
    }

    #[test]
    fn test_text_after_closing_tag_is_kept() {
        let rendered = render(
            &ComponentRegistry::with_defaults(),
            "<Callout>Note</Callout> and this trailing sentence matters.\n",
        );

        assert!(rendered.html.contains("<p>Note</p>"));
        assert!(rendered.html.contains("<p>and this trailing sentence matters.</p>"));
        let callout = rendered.html.find("class=\"callout").unwrap();
        assert!(callout < rendered.html.find("trailing sentence").unwrap());
    }

    #[test]
    fn test_text_after_self_closing_tag_is_kept() {
        let rendered = render(&ComponentRegistry::with_defaults(), "<File name=\"a.rs\" /> keep me\n");

        assert!(rendered.html.contains("a.rs"));
        assert!(rendered.html.contains("<p>keep me</p>"));
    }

    #[test]
    fn test_component_inside_list_item() {
        let rendered = render(
            &ComponentRegistry::with_defaults(),
            "- Item\n\n  <Callout>Inside</Callout>\n- Next\n",
        );
        let html = &rendered.html;

        assert_eq!(html.matches("<ul>").count(), 1);
        assert_eq!(html.matches("<li>").count(), 2);
        let callout = html.find("class=\"callout").unwrap();
        let first_item_end = html.find("</li>").unwrap();
        assert!(callout < first_item_end);
        assert!(!html.contains("mdx-block"));
    }
}
