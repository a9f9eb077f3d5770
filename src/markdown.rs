//! Markdown to HTML with heading anchors and table-of-contents extraction.

use std::collections::HashMap;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

/// One heading of a rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedMarkdown {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Render Markdown, giving every heading an id.
///
/// Explicit `{#id}` attributes win; other ids are slugs of the heading text,
/// suffixed `-1`, `-2`, ... when repeated.
pub fn render(markdown: &str) -> RenderedMarkdown {
    let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, options()).collect();
    let mut toc = Vec::new();
    let mut used: HashMap<String, usize> = HashMap::new();

    let mut i = 0;
    while i < events.len() {
        let (level, explicit) = match &events[i] {
            Event::Start(Tag::Heading { level, id, .. }) => (*level, id.clone()),
            _ => {
                i += 1;
                continue;
            }
        };

        let mut title = String::new();
        let mut j = i + 1;
        while j < events.len() && !matches!(events[j], Event::End(TagEnd::Heading(_))) {
            if let Event::Text(text) | Event::Code(text) = &events[j] {
                title.push_str(text);
            }
            j += 1;
        }

        let id = match explicit {
            Some(id) => id.to_string(),
            None => unique_slug(&title, &mut used),
        };
        if let Event::Start(Tag::Heading { id: slot, .. }) = &mut events[i] {
            *slot = Some(CowStr::from(id.clone()));
        }

        toc.push(TocEntry {
            level: level as u8,
            id,
            title: title.trim().to_string(),
        });
        i = j + 1;
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    RenderedMarkdown { html: out, toc }
}

/// Render Markdown to HTML only.
pub fn to_html(markdown: &str) -> String {
    render(markdown).html
}

/// Anchor slug of a heading: lowercase letters and digits joined by `-`.
pub fn slug(text: &str) -> String {
    let mut out = String::new();
    let mut dash = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if dash && !out.is_empty() {
                out.push('-');
            }
            dash = false;
            out.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            dash = true;
        }
    }
    out
}

fn unique_slug(text: &str, used: &mut HashMap<String, usize>) -> String {
    let base = slug(text);
    let base = if base.is_empty() { "section".to_string() } else { base };
    let count = used.entry(base.clone()).or_insert(0);
    let id = if *count == 0 {
        base
    } else {
        format!("{}-{}", base, count)
    };
    *count += 1;
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_get_ids_and_toc() {
        let rendered = render("# Title\n\n## Getting Started\n\ntext\n\n### `config` file\n");

        assert!(rendered.html.contains("<h2 id=\"getting-started\">Getting Started</h2>"));
        assert_eq!(rendered.toc.len(), 3);
        assert_eq!(rendered.toc[1].level, 2);
        assert_eq!(rendered.toc[2].id, "config-file");
        assert_eq!(rendered.toc[2].title, "config file");
    }

    #[test]
    fn test_duplicate_headings_are_suffixed() {
        let rendered = render("## Usage\n\n## Usage\n\n## Usage\n");
        let ids: Vec<&str> = rendered.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["usage", "usage-1", "usage-2"]);
    }

    #[test]
    fn test_explicit_heading_id_wins() {
        let rendered = render("## Install {#setup}\n");
        assert_eq!(rendered.toc[0].id, "setup");
        assert!(rendered.html.contains("id=\"setup\""));
    }

    #[test]
    fn test_cyrillic_slug() {
        assert_eq!(slug("Быстрый старт"), "быстрый-старт");
        assert_eq!(slug("Hello, World!"), "hello-world");
    }

    #[test]
    fn test_tables_enabled() {
        let html = to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }
}
