//! Page tree construction.
//!
//! Pages are grouped into folders by their slugs. A folder's `meta.json` may
//! set its title, icon, open state and the order of its children.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::i18n::Locale;
use crate::icons::{Icon, IconResolver};
use crate::source::Page;

/// Contents of a folder's `meta.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderMeta {
    pub title: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub default_open: bool,
    pub pages: Option<Vec<String>>,
}

/// Sidebar tree for one locale.
#[derive(Debug, Clone, Default)]
pub struct PageTree {
    pub name: String,
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone)]
pub enum TreeNode {
    Page(PageItem),
    Folder(FolderNode),
    Separator { name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageItem {
    pub name: String,
    pub url: String,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone)]
pub struct FolderNode {
    pub name: String,
    pub index: Option<PageItem>,
    pub children: Vec<TreeNode>,
    pub default_open: bool,
    pub icon: Option<Icon>,
}

impl PageTree {
    /// Pages in reading order: depth-first, folder index before its children.
    pub fn flatten(&self) -> Vec<&PageItem> {
        let mut out = Vec::new();
        flatten_into(&self.children, &mut out);
        out
    }
}

impl FolderNode {
    /// Whether `url` is this folder's index or lies anywhere below it.
    pub fn contains_url(&self, url: &str) -> bool {
        self.index.as_ref().is_some_and(|i| i.url == url)
            || self.children.iter().any(|child| match child {
                TreeNode::Page(item) => item.url == url,
                TreeNode::Folder(folder) => folder.contains_url(url),
                TreeNode::Separator { .. } => false,
            })
    }
}

fn flatten_into<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a PageItem>) {
    for node in nodes {
        match node {
            TreeNode::Page(item) => out.push(item),
            TreeNode::Folder(folder) => {
                if let Some(index) = &folder.index {
                    out.push(index);
                }
                flatten_into(&folder.children, out);
            }
            TreeNode::Separator { .. } => {}
        }
    }
}

/// Intermediate folder used while grouping pages by slug.
#[derive(Default)]
struct Dir<'a> {
    index: Option<&'a Page>,
    files: BTreeMap<String, &'a Page>,
    dirs: BTreeMap<String, Dir<'a>>,
}

/// Build the tree for `locale` from its effective page set.
///
/// `metas` maps a folder's slug path (empty for the root) to its meta file.
pub fn build_tree(
    locale: Locale,
    name: &str,
    pages: &[&Page],
    metas: &HashMap<String, FolderMeta>,
    icons: &dyn IconResolver,
) -> PageTree {
    let mut root = Dir::default();

    for &page in pages {
        let Some((last, parents)) = page.slugs.split_last() else {
            root.index = Some(page);
            continue;
        };
        let mut dir = &mut root;
        for segment in parents {
            dir = dir.dirs.entry(segment.clone()).or_default();
        }
        if page.is_index() {
            dir.dirs.entry(last.clone()).or_default().index = Some(page);
        } else {
            dir.files.insert(last.clone(), page);
        }
    }

    let builder = TreeBuilder {
        locale,
        metas,
        icons,
    };

    let mut children = Vec::new();
    if let Some(index) = root.index {
        children.push(TreeNode::Page(builder.item(index)));
    }
    children.extend(builder.children(&root, ""));

    PageTree {
        name: metas
            .get("")
            .and_then(|m| m.title.clone())
            .unwrap_or_else(|| name.to_string()),
        children,
    }
}

struct TreeBuilder<'a> {
    locale: Locale,
    metas: &'a HashMap<String, FolderMeta>,
    icons: &'a dyn IconResolver,
}

impl TreeBuilder<'_> {
    fn item(&self, page: &Page) -> PageItem {
        PageItem {
            name: page.title.clone(),
            url: page.url(self.locale),
            icon: page.icon.as_deref().and_then(|n| self.icons.resolve(n)),
        }
    }

    fn folder(&self, name: &str, dir: &Dir<'_>, key: &str) -> FolderNode {
        let meta = self.metas.get(key);
        let icon_name = meta
            .and_then(|m| m.icon.as_deref())
            .or_else(|| dir.index.and_then(|p| p.icon.as_deref()));

        FolderNode {
            name: meta
                .and_then(|m| m.title.clone())
                .or_else(|| dir.index.map(|p| p.title.clone()))
                .unwrap_or_else(|| humanize(name)),
            index: dir.index.map(|p| self.item(p)),
            children: self.children(dir, key),
            default_open: meta.is_some_and(|m| m.default_open),
            icon: icon_name.and_then(|n| self.icons.resolve(n)),
        }
    }

    fn node(&self, name: &str, dir: &Dir<'_>, key: &str) -> Option<TreeNode> {
        if let Some(page) = dir.files.get(name) {
            return Some(TreeNode::Page(self.item(page)));
        }
        dir.dirs.get(name).map(|sub| {
            let sub_key = if key.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", key, name)
            };
            TreeNode::Folder(self.folder(name, sub, &sub_key))
        })
    }

    /// Child nodes of a folder, ordered by its `meta.json` when present.
    fn children(&self, dir: &Dir<'_>, key: &str) -> Vec<TreeNode> {
        let mut default_order: Vec<&String> = dir.files.keys().chain(dir.dirs.keys()).collect();
        default_order.sort();
        default_order.dedup();

        let Some(listed) = self.metas.get(key).and_then(|m| m.pages.as_ref()) else {
            return default_order
                .into_iter()
                .filter_map(|name| self.node(name, dir, key))
                .collect();
        };

        let explicit: Vec<&str> = listed
            .iter()
            .map(String::as_str)
            .filter(|e| *e != "..." && !is_separator(e))
            .collect();

        let mut nodes = Vec::new();
        for entry in listed {
            if entry == "..." {
                nodes.extend(
                    default_order
                        .iter()
                        .filter(|name| !explicit.contains(&name.as_str()))
                        .filter_map(|name| self.node(name, dir, key)),
                );
            } else if is_separator(entry) {
                nodes.push(TreeNode::Separator {
                    name: entry.trim_matches('-').trim().to_string(),
                });
            } else if let Some(node) = self.node(entry, dir, key) {
                nodes.push(node);
            }
        }
        nodes
    }
}

fn is_separator(entry: &str) -> bool {
    entry.len() > 6 && entry.starts_with("---") && entry.ends_with("---")
}

/// `get-started` → `Get started`
fn humanize(name: &str) -> String {
    let spaced = name.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
