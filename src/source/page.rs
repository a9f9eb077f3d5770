//! Content pages and their YAML frontmatter.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::i18n::Locale;

/// Frontmatter fields the portal understands; other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub full: bool,
}

/// Split a content file into its frontmatter and body.
///
/// Files without a leading `---` fence have default frontmatter.
pub fn split_frontmatter(source: &str) -> Result<(Frontmatter, &str)> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(after_open) = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    else {
        return Ok((Frontmatter::default(), source));
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            let frontmatter = if yaml.trim().is_empty() {
                Frontmatter::default()
            } else {
                serde_yaml::from_str(yaml).context("Invalid frontmatter")?
            };
            return Ok((frontmatter, body));
        }
        offset += line.len();
    }

    anyhow::bail!("Unterminated frontmatter block")
}

/// A documentation page loaded from the content directory.
#[derive(Debug, Clone)]
pub struct Page {
    /// Locale the file was written in (may differ from the serving locale on fallback)
    pub locale: Locale,
    /// URL segments below `/docs`
    pub slugs: Vec<String>,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub full: bool,
    /// Markdown/MDX body without frontmatter
    pub body: String,
    /// Path relative to the locale directory
    pub path: PathBuf,
    pub last_modified: Option<DateTime<Utc>>,
}

impl Page {
    /// Parse a content file.
    ///
    /// `relative` is the file path below the locale directory, e.g.
    /// `guides/index.mdx`.
    pub fn parse(locale: Locale, relative: &Path, source: &str) -> Result<Self> {
        let (frontmatter, body) = split_frontmatter(source)
            .with_context(|| format!("Failed to parse {}", relative.display()))?;

        let slugs = slugs_for(relative);
        let title = frontmatter
            .title
            .clone()
            .or_else(|| first_heading(body))
            .unwrap_or_else(|| {
                relative
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });

        Ok(Self {
            locale,
            slugs,
            title,
            description: frontmatter.description,
            icon: frontmatter.icon,
            full: frontmatter.full,
            body: body.to_string(),
            path: relative.to_path_buf(),
            last_modified: None,
        })
    }

    /// Read and parse a file below `locale_dir`.
    pub fn load(locale: Locale, locale_dir: &Path, file: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let relative = file.strip_prefix(locale_dir).unwrap_or(file);

        let mut page = Self::parse(locale, relative, &source)?;
        page.last_modified = std::fs::metadata(file)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        Ok(page)
    }

    /// Slug path joined with `/`; empty for the root index page.
    pub fn slug_key(&self) -> String {
        self.slugs.join("/")
    }

    /// URL of this page when served in `locale`.
    pub fn url(&self, locale: Locale) -> String {
        page_url(locale, &self.slugs)
    }

    /// Whether the file is a folder index (`index.md[x]`).
    pub fn is_index(&self) -> bool {
        self.path.file_stem().is_some_and(|stem| stem == "index")
    }
}

pub fn page_url(locale: Locale, slugs: &[String]) -> String {
    if slugs.is_empty() {
        format!("/{}/docs", locale.code())
    } else {
        format!("/{}/docs/{}", locale.code(), slugs.join("/"))
    }
}

fn slugs_for(relative: &Path) -> Vec<String> {
    let mut slugs: Vec<String> = relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if slugs.last().is_some_and(|s| s == "index") {
        slugs.pop();
    }
    slugs
}

fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|heading| heading.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_frontmatter() {
        let source = "---\ntitle: Overview\ndescription: Start here\nicon: Rocket\n---\n\n# Body\n";
        let (frontmatter, body) = split_frontmatter(source).unwrap();

        assert_eq!(frontmatter.title.as_deref(), Some("Overview"));
        assert_eq!(frontmatter.description.as_deref(), Some("Start here"));
        assert_eq!(frontmatter.icon.as_deref(), Some("Rocket"));
        assert!(!frontmatter.full);
        assert_eq!(body, "\n# Body\n");
    }

    #[test]
    fn test_split_frontmatter_ignores_unknown_keys() {
        let source = "---\ntitle: Get user\nfull: true\n_openapi:\n  method: GET\n---\nbody";
        let (frontmatter, body) = split_frontmatter(source).unwrap();

        assert_eq!(frontmatter.title.as_deref(), Some("Get user"));
        assert!(frontmatter.full);
        assert_eq!(body, "body");
    }

    #[test]
    fn test_split_frontmatter_absent() {
        let (frontmatter, body) = split_frontmatter("# Just markdown").unwrap();
        assert_eq!(frontmatter, Frontmatter::default());
        assert_eq!(body, "# Just markdown");
    }

    #[test]
    fn test_split_frontmatter_empty_block() {
        let (frontmatter, body) = split_frontmatter("---\n---\ntext").unwrap();
        assert_eq!(frontmatter, Frontmatter::default());
        assert_eq!(body, "text");
    }

    #[test]
    fn test_split_frontmatter_unterminated() {
        assert!(split_frontmatter("---\ntitle: x\n").is_err());
    }

    #[test]
    fn test_page_slugs_and_url() {
        let page = Page::parse(Locale::En, Path::new("guides/setup.mdx"), "# Setup").unwrap();

        assert_eq!(page.slugs, vec!["guides", "setup"]);
        assert_eq!(page.url(Locale::Ru), "/ru/docs/guides/setup");
        assert_eq!(page.title, "Setup");
        assert!(!page.is_index());
    }

    #[test]
    fn test_index_page_maps_to_folder_url() {
        let page = Page::parse(Locale::En, Path::new("guides/index.md"), "text").unwrap();

        assert_eq!(page.slugs, vec!["guides"]);
        assert_eq!(page.url(Locale::En), "/en/docs/guides");
        assert!(page.is_index());
        assert_eq!(page.title, "index");
    }

    #[test]
    fn test_root_index_url() {
        let page = Page::parse(Locale::Uz, Path::new("index.mdx"), "").unwrap();
        assert!(page.slugs.is_empty());
        assert_eq!(page.url(Locale::Uz), "/uz/docs");
    }

    #[test]
    fn test_title_falls_back_to_heading_then_stem() {
        let page = Page::parse(Locale::En, Path::new("1-index.mdx"), "intro\n# Welcome\n").unwrap();
        assert_eq!(page.title, "Welcome");

        let page = Page::parse(Locale::En, Path::new("1-index.mdx"), "no heading").unwrap();
        assert_eq!(page.title, "1-index");
    }
}
