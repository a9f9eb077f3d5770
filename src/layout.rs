//! HTML shells: the root document and the docs page layout.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use serde_json::json;

use crate::config::Config;
use crate::i18n::{Locale, LocaleRegistry, Translations, UiKey};
use crate::icons::Icon;
use crate::markdown::TocEntry;
use crate::source::{PageItem, PageNeighbours, PageTree, TreeNode};
use crate::switcher::{render_switcher, SWITCHER_SCRIPT};

pub const STYLESHEET_PATH: &str = "/_static/global.css";

/// Strings and locale list embedded for client-side scripts.
pub fn i18n_payload(locale: Locale, translations: &Translations) -> String {
    let locales: Vec<_> = LocaleRegistry::get()
        .list_all()
        .into_iter()
        .map(|config| json!({ "name": config.native_name, "locale": config.code }))
        .collect();
    let payload = json!({
        "locale": locale.code(),
        "locales": locales,
        "translations": translations.table(locale),
    });
    // `</script>` inside the JSON must not close the element
    payload.to_string().replace("</", "<\\/")
}

/// Root HTML document wrapping `body`.
pub fn render_root(
    locale: Locale,
    title: &str,
    description: Option<&str>,
    translations: &Translations,
    body: &str,
) -> String {
    let mut html = String::with_capacity(body.len() + 2048);
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n",
        locale.code(),
        text(title)
    );
    if let Some(description) = description {
        let _ = writeln!(html, "<meta name=\"description\" content=\"{}\">", attr(description));
    }
    let _ = write!(
        html,
        "<link rel=\"stylesheet\" href=\"{}\">\n\
         <script id=\"i18n\" type=\"application/json\">{}</script>\n\
         </head>\n<body>\n{}\n</body>\n</html>\n",
        STYLESHEET_PATH,
        i18n_payload(locale, translations),
        body
    );
    html
}

/// Everything the docs layout shows around a page body.
pub struct DocsPage<'a> {
    pub locale: Locale,
    /// Request path, used for the active sidebar entry and the switcher
    pub path: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub body_html: &'a str,
    pub toc: &'a [TocEntry],
    pub last_modified: Option<DateTime<Utc>>,
    pub neighbours: &'a PageNeighbours,
    /// Full-width pages hide the table of contents
    pub full: bool,
}

/// Docs layout: nav, sidebar, article, TOC and footer inside the root shell.
pub fn render_docs(
    config: &Config,
    tree: &PageTree,
    translations: &Translations,
    page: &DocsPage<'_>,
) -> String {
    let locale = page.locale;
    let mut body = String::new();

    let _ = write!(
        body,
        "<div class=\"docs-layout\"><aside class=\"sidebar\">\
         <nav class=\"nav-title\"><a href=\"{}\">{}</a></nav>",
        attr(&config.home_url(locale)),
        text(&config.site_title)
    );
    body.push_str(&search_box(locale, translations));
    body.push_str("<nav class=\"sidebar-tree\">");
    render_nodes(&mut body, &tree.children, page.path);
    body.push_str("</nav><footer class=\"sidebar-footer\">");
    body.push_str(&render_switcher(page.path, locale, translations));
    body.push_str("</footer></aside>");

    body.push_str("<main class=\"docs-page\"><article>");
    let _ = write!(body, "<h1>{}</h1>", text(page.title));
    if let Some(description) = page.description {
        let _ = write!(body, "<p class=\"page-description\">{}</p>", text(description));
    }
    body.push_str("<div class=\"prose\">");
    body.push_str(page.body_html);
    body.push_str("</div>");

    if let Some(modified) = page.last_modified {
        let _ = write!(
            body,
            "<p class=\"last-update\">{} <time datetime=\"{}\">{}</time></p>",
            text(translations.get(locale, UiKey::LastUpdate)),
            modified.to_rfc3339(),
            modified.format("%Y-%m-%d")
        );
    }
    body.push_str(&render_neighbours(page.neighbours, locale, translations));
    body.push_str("</article></main>");

    if !page.full && !page.toc.is_empty() {
        body.push_str(&render_toc(page.toc, locale, translations));
    }
    body.push_str("</div>");
    let _ = write!(body, "<script>{}</script><script>{}</script>", SWITCHER_SCRIPT, SEARCH_SCRIPT);

    let title = format!("{} | {}", page.title, config.site_title);
    render_root(locale, &title, page.description, translations, &body)
}

/// Localized not-found page.
pub fn render_not_found(
    config: &Config,
    tree: &PageTree,
    translations: &Translations,
    locale: Locale,
    path: &str,
) -> String {
    let title = translations.get(locale, UiKey::PageNotFound);
    let body = format!(
        "<p><a href=\"{}\">{}</a></p>",
        attr(&config.home_url(locale)),
        text(&config.site_title)
    );
    let neighbours = PageNeighbours::default();
    render_docs(
        config,
        tree,
        translations,
        &DocsPage {
            locale,
            path,
            title,
            description: None,
            body_html: &body,
            toc: &[],
            last_modified: None,
            neighbours: &neighbours,
            full: true,
        },
    )
}

fn search_box(locale: Locale, translations: &Translations) -> String {
    let placeholder = translations.get(locale, UiKey::Search);
    format!(
        "<div class=\"search\"><input type=\"search\" data-search data-locale=\"{}\" \
         placeholder=\"{}\" aria-label=\"{}\"><ul class=\"search-results\" hidden></ul></div>",
        locale.code(),
        attr(placeholder),
        attr(placeholder)
    )
}

fn item_link(item: &PageItem, current: &str, class: &str) -> String {
    let active = if item.url == current { " active" } else { "" };
    let aria = if item.url == current { " aria-current=\"page\"" } else { "" };
    format!(
        "<a class=\"{}{}\" href=\"{}\"{}>{}{}</a>",
        class,
        active,
        attr(&item.url),
        aria,
        icon_svg(item.icon.as_ref()),
        text(&item.name)
    )
}

fn icon_svg(icon: Option<&Icon>) -> String {
    icon.map(Icon::to_svg).unwrap_or_default()
}

fn render_nodes(html: &mut String, nodes: &[TreeNode], current: &str) {
    html.push_str("<ul>");
    for node in nodes {
        match node {
            TreeNode::Page(item) => {
                let _ = write!(html, "<li>{}</li>", item_link(item, current, "page-link"));
            }
            TreeNode::Separator { name } => {
                let _ = write!(html, "<li class=\"separator\">{}</li>", text(name));
            }
            TreeNode::Folder(folder) => {
                let open = folder.default_open || folder.contains_url(current);
                let summary = match &folder.index {
                    Some(index) => item_link(index, current, "folder-link"),
                    None => format!("{}{}", icon_svg(folder.icon.as_ref()), text(&folder.name)),
                };
                let _ = write!(
                    html,
                    "<li class=\"folder\"><details{}><summary>{}</summary>",
                    if open { " open" } else { "" },
                    summary
                );
                render_nodes(html, &folder.children, current);
                html.push_str("</details></li>");
            }
        }
    }
    html.push_str("</ul>");
}

fn render_toc(toc: &[TocEntry], locale: Locale, translations: &Translations) -> String {
    let mut html = format!(
        "<aside class=\"toc\"><p class=\"toc-title\">{}</p><ul>",
        text(translations.get(locale, UiKey::Toc))
    );
    for entry in toc.iter().filter(|e| (2..=4).contains(&e.level)) {
        let _ = write!(
            html,
            "<li class=\"toc-level-{}\"><a href=\"#{}\">{}</a></li>",
            entry.level,
            attr(&entry.id),
            text(&entry.title)
        );
    }
    html.push_str("</ul></aside>");
    html
}

fn render_neighbours(neighbours: &PageNeighbours, locale: Locale, translations: &Translations) -> String {
    if neighbours.previous.is_none() && neighbours.next.is_none() {
        return String::new();
    }

    let mut html = String::from("<nav class=\"page-footer\">");
    if let Some(previous) = &neighbours.previous {
        let _ = write!(
            html,
            "<a class=\"page-previous\" href=\"{}\"><span>{}</span>{}</a>",
            attr(&previous.url),
            text(translations.get(locale, UiKey::PreviousPage)),
            text(&previous.name)
        );
    }
    if let Some(next) = &neighbours.next {
        let _ = write!(
            html,
            "<a class=\"page-next\" href=\"{}\"><span>{}</span>{}</a>",
            attr(&next.url),
            text(translations.get(locale, UiKey::NextPage)),
            text(&next.name)
        );
    }
    html.push_str("</nav>");
    html
}

/// Queries `/api/search` as the user types and lists the hits.
pub const SEARCH_SCRIPT: &str = r#"(function () {
  var i18n = JSON.parse(document.getElementById('i18n').textContent);
  document.querySelectorAll('[data-search]').forEach(function (input) {
    var list = input.parentNode.querySelector('.search-results');
    var timer;
    input.addEventListener('input', function () {
      clearTimeout(timer);
      timer = setTimeout(function () {
        var query = input.value.trim();
        if (!query) { list.hidden = true; return; }
        fetch('/api/search?locale=' + i18n.locale + '&query=' + encodeURIComponent(query))
          .then(function (res) { return res.json(); })
          .then(function (results) {
            list.innerHTML = '';
            if (!results.length) {
              var empty = document.createElement('li');
              empty.textContent = i18n.translations.searchNoResult;
              list.appendChild(empty);
            }
            results.forEach(function (result) {
              var li = document.createElement('li');
              var a = document.createElement('a');
              a.href = result.url;
              a.className = 'search-' + result.type;
              a.textContent = result.content;
              li.appendChild(a);
              list.appendChild(li);
            });
            list.hidden = false;
          });
      }, 150);
    });
  });
})();"#;

pub const GLOBAL_CSS: &str = r#":root {
  --fg: #1f2328;
  --muted: #656d76;
  --border: #d0d7de;
  --accent: #2563eb;
  --bg-subtle: #f6f8fa;
}
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, -apple-system, "Segoe UI", sans-serif; color: var(--fg); line-height: 1.6; }
a { color: var(--accent); text-decoration: none; }
.docs-layout { display: grid; grid-template-columns: 280px minmax(0, 1fr) 220px; min-height: 100vh; }
.sidebar { border-right: 1px solid var(--border); padding: 1rem; display: flex; flex-direction: column; gap: 1rem; position: sticky; top: 0; height: 100vh; overflow-y: auto; }
.nav-title a { font-weight: 700; font-size: 1.1rem; color: var(--fg); }
.sidebar-tree ul { list-style: none; margin: 0; padding-left: 0.75rem; }
.sidebar-tree > ul { padding-left: 0; }
.sidebar-tree a { display: flex; align-items: center; gap: 0.4rem; padding: 0.2rem 0.4rem; border-radius: 4px; color: var(--muted); }
.sidebar-tree a.active { background: var(--bg-subtle); color: var(--accent); font-weight: 600; }
.sidebar-tree .separator { margin-top: 0.8rem; font-size: 0.8rem; font-weight: 600; text-transform: uppercase; color: var(--muted); }
.sidebar-footer { margin-top: auto; }
.language-switcher select { width: 100%; padding: 0.3rem; }
.search input { width: 100%; padding: 0.4rem 0.6rem; border: 1px solid var(--border); border-radius: 6px; }
.search-results { list-style: none; padding: 0; margin: 0.4rem 0; }
.docs-page { padding: 2rem 3rem; max-width: 900px; }
.page-description { color: var(--muted); font-size: 1.1rem; }
.last-update { color: var(--muted); font-size: 0.85rem; margin-top: 2rem; }
.page-footer { display: flex; justify-content: space-between; gap: 1rem; margin-top: 2rem; }
.page-footer a { display: flex; flex-direction: column; border: 1px solid var(--border); border-radius: 8px; padding: 0.6rem 1rem; }
.page-footer span { font-size: 0.8rem; color: var(--muted); }
.toc { padding: 2rem 1rem; font-size: 0.85rem; position: sticky; top: 0; height: 100vh; }
.toc ul { list-style: none; padding: 0; }
.toc-level-3 { padding-left: 0.75rem; }
.toc-level-4 { padding-left: 1.5rem; }
.callout { border-left: 4px solid var(--accent); background: var(--bg-subtle); padding: 0.6rem 1rem; border-radius: 4px; margin: 1rem 0; }
.callout-warn { border-color: #d97706; }
.callout-error { border-color: #dc2626; }
.callout-success { border-color: #16a34a; }
.callout-title { font-weight: 600; margin: 0; }
.cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 1rem; }
.card { display: block; border: 1px solid var(--border); border-radius: 8px; padding: 1rem; color: var(--fg); }
.card-title { margin: 0.3rem 0; font-size: 1rem; }
.tab-list { display: flex; gap: 0.5rem; border-bottom: 1px solid var(--border); }
.tab-list button { background: none; border: none; padding: 0.4rem 0.8rem; cursor: pointer; }
.tab-list button[aria-selected="true"] { border-bottom: 2px solid var(--accent); }
.accordion { border: 1px solid var(--border); border-radius: 6px; margin: 0.5rem 0; padding: 0.4rem 0.8rem; }
.steps { border-left: 2px solid var(--border); padding-left: 1.2rem; counter-reset: step; }
.step { counter-increment: step; }
.files { list-style: none; font-family: monospace; }
.api-endpoint { display: flex; gap: 0.5rem; align-items: center; border: 1px solid var(--border); border-radius: 6px; padding: 0.4rem 0.6rem; }
.api-method { font-weight: 700; font-size: 0.8rem; padding: 0.1rem 0.4rem; border-radius: 4px; background: var(--bg-subtle); }
.api-method-get { color: #16a34a; }
.api-method-post { color: #2563eb; }
.api-method-put, .api-method-patch { color: #d97706; }
.api-method-delete { color: #dc2626; }
.api-params { width: 100%; border-collapse: collapse; }
.api-params th, .api-params td { border-bottom: 1px solid var(--border); padding: 0.3rem; text-align: left; }
.api-required { color: #dc2626; }
.api-properties { list-style: none; padding-left: 1rem; }
pre { background: var(--bg-subtle); padding: 0.8rem; border-radius: 6px; overflow-x: auto; }
table { border-collapse: collapse; }
th, td { border: 1px solid var(--border); padding: 0.3rem 0.6rem; }
@media (max-width: 900px) {
  .docs-layout { grid-template-columns: 1fr; }
  .sidebar { position: static; height: auto; }
  .toc { display: none; }
}
"#;
