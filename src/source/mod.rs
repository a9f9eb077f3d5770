//! Content source: pages and page trees per locale.
//!
//! Content lives under `{content_dir}/{locale}/`. Pages missing from a locale
//! fall back to the default locale's copy, so generated API pages written
//! only for `en` are served under every locale prefix.

mod page;
mod tree;

pub use page::{page_url, split_frontmatter, Frontmatter, Page};
pub use tree::{build_tree, FolderMeta, FolderNode, PageItem, PageTree, TreeNode};

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::i18n::Locale;
use crate::icons::IconResolver;

/// Neighbouring pages in reading order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageNeighbours {
    pub previous: Option<PageItem>,
    pub next: Option<PageItem>,
}

/// Pages and tree served under one locale prefix.
#[derive(Debug, Default)]
struct LocaleContent {
    pages: HashMap<String, Arc<Page>>,
    tree: PageTree,
}

/// Raw files found in one locale directory.
#[derive(Default)]
struct LocaleFiles {
    pages: HashMap<String, Arc<Page>>,
    metas: HashMap<String, FolderMeta>,
}

/// Loaded content collection; immutable once built.
#[derive(Debug, Default)]
pub struct Source {
    locales: HashMap<Locale, LocaleContent>,
}

impl Source {
    /// Load every locale directory below `content_dir`.
    ///
    /// A missing locale directory is not an error: that locale is served
    /// entirely from the default locale's pages.
    pub fn load(content_dir: &Path, tree_name: &str, icons: &dyn IconResolver) -> Result<Self> {
        Self::load_with_fallback(content_dir, Locale::default_locale(), tree_name, icons)
    }

    /// Like [`Source::load`], with `fallback` supplying the pages other
    /// locales are missing.
    pub fn load_with_fallback(
        content_dir: &Path,
        fallback: Locale,
        tree_name: &str,
        icons: &dyn IconResolver,
    ) -> Result<Self> {
        let mut files = HashMap::new();
        for locale in Locale::ALL {
            let dir = content_dir.join(locale.code());
            let found = if dir.is_dir() {
                scan_locale(locale, &dir)?
            } else {
                warn!("No content directory for locale {}: {}", locale, dir.display());
                LocaleFiles::default()
            };
            files.insert(locale, found);
        }

        Ok(Self::from_files(files, fallback, tree_name, icons))
    }

    fn from_files(
        mut files: HashMap<Locale, LocaleFiles>,
        default_locale: Locale,
        tree_name: &str,
        icons: &dyn IconResolver,
    ) -> Self {
        let fallback = files.remove(&default_locale).unwrap_or_default();

        let mut locales = HashMap::new();
        for locale in Locale::ALL {
            let own = if locale == default_locale {
                LocaleFiles {
                    pages: fallback.pages.clone(),
                    metas: fallback.metas.clone(),
                }
            } else {
                files.remove(&locale).unwrap_or_default()
            };

            let mut pages = fallback.pages.clone();
            pages.extend(own.pages);
            let mut metas = fallback.metas.clone();
            metas.extend(own.metas);

            let mut ordered: Vec<&Page> = pages.values().map(Arc::as_ref).collect();
            ordered.sort_by(|a, b| a.slugs.cmp(&b.slugs));
            let tree = build_tree(locale, tree_name, &ordered, &metas, icons);

            info!("Loaded {} pages for locale {}", pages.len(), locale);
            locales.insert(locale, LocaleContent { pages, tree });
        }

        Self { locales }
    }

    /// Build a source from already-parsed pages, all treated as written in
    /// their own `locale`.
    pub fn from_pages(pages: Vec<Page>, tree_name: &str, icons: &dyn IconResolver) -> Self {
        let mut files: HashMap<Locale, LocaleFiles> = HashMap::new();
        for page in pages {
            files
                .entry(page.locale)
                .or_default()
                .pages
                .insert(page.slug_key(), Arc::new(page));
        }
        Self::from_files(files, Locale::default_locale(), tree_name, icons)
    }

    /// Page served at `/{locale}/docs/{slugs}`.
    pub fn get_page(&self, locale: Locale, slugs: &[&str]) -> Option<&Arc<Page>> {
        self.locales.get(&locale)?.pages.get(&slugs.join("/"))
    }

    pub fn page_tree(&self, locale: Locale) -> Option<&PageTree> {
        self.locales.get(&locale).map(|content| &content.tree)
    }

    /// All pages served under a locale, in slug order.
    pub fn pages(&self, locale: Locale) -> Vec<&Arc<Page>> {
        let mut pages: Vec<_> = self
            .locales
            .get(&locale)
            .map(|content| content.pages.values().collect())
            .unwrap_or_default();
        pages.sort_by(|a, b| a.slugs.cmp(&b.slugs));
        pages
    }

    /// Previous and next page around `url` in the locale's reading order.
    pub fn neighbours(&self, locale: Locale, url: &str) -> PageNeighbours {
        let Some(tree) = self.page_tree(locale) else {
            return PageNeighbours::default();
        };
        let flat = tree.flatten();
        let Some(pos) = flat.iter().position(|item| item.url == url) else {
            return PageNeighbours::default();
        };

        PageNeighbours {
            previous: pos.checked_sub(1).map(|i| flat[i].clone()),
            next: flat.get(pos + 1).map(|item| (*item).clone()),
        }
    }
}

fn scan_locale(locale: Locale, dir: &Path) -> Result<LocaleFiles> {
    let mut found = LocaleFiles::default();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() == dir || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let extension = path.extension().and_then(|e| e.to_str());
        if entry.file_name() == "meta.json" {
            let key = path
                .parent()
                .and_then(|p| p.strip_prefix(dir).ok())
                .map(|p| {
                    p.components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect::<Vec<_>>()
                        .join("/")
                })
                .unwrap_or_default();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let meta: FolderMeta = serde_json::from_str(&content)
                .with_context(|| format!("Invalid meta file {}", path.display()))?;
            debug!("Loaded folder meta {}", path.display());
            found.metas.insert(key, meta);
        } else if matches!(extension, Some("md") | Some("mdx")) {
            let page = Page::load(locale, dir, path)?;
            if let Some(previous) = found.pages.insert(page.slug_key(), Arc::new(page)) {
                warn!(
                    "{} shadows another page with the same URL, replacing {}",
                    path.display(),
                    previous.path.display()
                );
            }
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::IconRegistry;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "en/1-index.mdx", "---\ntitle: Introduction\n---\nHello");
        write(root, "en/2-usage.mdx", "---\ntitle: Usage\n---\nUse it");
        write(root, "en/api/users/get.mdx", "---\ntitle: List users\n---\n");
        write(root, "en/api/meta.json", r#"{"title": "API Reference", "icon": "Code"}"#);
        write(root, "ru/1-index.mdx", "---\ntitle: Введение\n---\nПривет");
        write(root, "ru/.hidden/x.mdx", "# Hidden");
        dir
    }

    #[test]
    fn test_load_pages_per_locale() {
        let dir = fixture();
        let source = Source::load(dir.path(), "Dvoice", &IconRegistry::builtin()).unwrap();

        let page = source.get_page(Locale::Ru, &["1-index"]).unwrap();
        assert_eq!(page.title, "Введение");
        assert_eq!(page.locale, Locale::Ru);
        assert!(page.last_modified.is_some());
    }

    #[test]
    fn test_missing_pages_fall_back_to_default_locale() {
        let dir = fixture();
        let source = Source::load(dir.path(), "Dvoice", &IconRegistry::builtin()).unwrap();

        let page = source.get_page(Locale::Uz, &["api", "users", "get"]).unwrap();
        assert_eq!(page.locale, Locale::En);
        assert_eq!(page.url(Locale::Uz), "/uz/docs/api/users/get");

        let page = source.get_page(Locale::Ru, &["2-usage"]).unwrap();
        assert_eq!(page.title, "Usage");
    }

    #[test]
    fn test_hidden_directories_are_skipped() {
        let dir = fixture();
        let source = Source::load(dir.path(), "Dvoice", &IconRegistry::builtin()).unwrap();
        assert!(source.get_page(Locale::Ru, &[".hidden", "x"]).is_none());
    }

    #[test]
    fn test_tree_uses_meta_and_locale_urls() {
        let dir = fixture();
        let source = Source::load(dir.path(), "Dvoice", &IconRegistry::builtin()).unwrap();

        let tree = source.page_tree(Locale::Ru).unwrap();
        assert_eq!(tree.name, "Dvoice");

        let folder = tree
            .children
            .iter()
            .find_map(|node| match node {
                TreeNode::Folder(folder) => Some(folder),
                _ => None,
            })
            .unwrap();
        assert_eq!(folder.name, "API Reference");
        assert_eq!(folder.icon.unwrap().name, "Code");
        assert!(folder.contains_url("/ru/docs/api/users/get"));
    }

    #[test]
    fn test_neighbours() {
        let dir = fixture();
        let source = Source::load(dir.path(), "Dvoice", &IconRegistry::builtin()).unwrap();

        let around = source.neighbours(Locale::En, "/en/docs/2-usage");
        assert_eq!(around.previous.unwrap().name, "Introduction");
        assert_eq!(around.next.unwrap().name, "List users");

        let first = source.neighbours(Locale::En, "/en/docs/1-index");
        assert!(first.previous.is_none());

        assert_eq!(source.neighbours(Locale::En, "/en/docs/nope"), PageNeighbours::default());
    }

    #[test]
    fn test_missing_content_dir_gives_empty_locales() {
        let dir = TempDir::new().unwrap();
        let source = Source::load(dir.path(), "Dvoice", &IconRegistry::builtin()).unwrap();

        assert!(source.pages(Locale::En).is_empty());
        assert!(source.page_tree(Locale::Uz).unwrap().children.is_empty());
    }

    #[test]
    fn test_configured_fallback_locale() {
        let dir = fixture();
        let source =
            Source::load_with_fallback(dir.path(), Locale::Ru, "Dvoice", &IconRegistry::builtin()).unwrap();

        let page = source.get_page(Locale::Uz, &["1-index"]).unwrap();
        assert_eq!(page.title, "Введение");
        assert_eq!(page.locale, Locale::Ru);

        // The fallback locale does not borrow pages from en
        assert!(source.get_page(Locale::Ru, &["2-usage"]).is_none());
        assert!(source.get_page(Locale::En, &["2-usage"]).is_some());
    }

    #[test]
    fn test_page_and_folder_index_share_a_url() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "en/guide/index.mdx", "---\ntitle: Folder index\n---\n");
        write(dir.path(), "en/guide.mdx", "---\ntitle: Flat page\n---\n");

        let source = Source::load(dir.path(), "Dvoice", &IconRegistry::builtin()).unwrap();

        // Walk order is by file name, so `guide.mdx` is seen last
        let page = source.get_page(Locale::En, &["guide"]).unwrap();
        assert_eq!(page.title, "Flat page");
        assert_eq!(source.pages(Locale::En).len(), 1);
    }

    #[test]
    fn test_invalid_meta_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "en/meta.json", "{ not json");

        assert!(Source::load(dir.path(), "Dvoice", &IconRegistry::builtin()).is_err());
    }
}
