//! Content page generation from OpenAPI documents.
//!
//! Each generated file is a content page with frontmatter and a single
//! `<APIPage>` tag; the operation details are rendered at request time from
//! the loaded document. Output depends only on the input documents, so
//! regenerating from an unchanged spec rewrites identical bytes.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::openapi::{OpenApiDocument, OperationRef};

pub const GENERATED_COMMENT: &str =
    "{/* This file was generated by generate-openapi-docs. Do not edit this file directly. */}";

/// How operations are split into files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Per {
    /// One file per operation
    Operation,
    /// One file per tag
    Tag,
    /// One file per input document
    File,
}

/// Folder layout for `Per::Operation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    /// Folders follow the route segments
    Route,
    /// One folder per tag
    Tag,
    /// All files directly in the output directory
    None,
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub per: Per,
    pub group_by: GroupBy,
    pub add_generated_comment: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            inputs: vec![PathBuf::from("./openapi.yaml")],
            output: PathBuf::from("./content/docs/en/api"),
            per: Per::Operation,
            group_by: GroupBy::Route,
            add_generated_comment: true,
        }
    }
}

/// A file to be written, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

#[derive(Serialize)]
struct PageFrontmatter<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    full: bool,
    #[serde(rename = "_openapi", skip_serializing_if = "Option::is_none")]
    openapi: Option<OperationMeta<'a>>,
}

#[derive(Serialize)]
struct OperationMeta<'a> {
    method: String,
    route: &'a str,
}

/// Generate pages for every input and write them below `options.output`.
///
/// Returns the written paths. A malformed input aborts before anything is written.
pub fn generate(options: &GenerateOptions) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in &options.inputs {
        let document = OpenApiDocument::from_path(input)?;
        let document_ref = document_ref(input);
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "openapi".to_string());
        files.extend(generate_files(&document, &document_ref, &stem, options));
    }

    let mut seen = BTreeSet::new();
    for file in &files {
        if !seen.insert(&file.path) {
            warn!("Generated path {} is produced more than once", file.path.display());
        }
    }

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let target = options.output.join(&file.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&target, &file.content)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        debug!("Wrote {}", target.display());
        written.push(target);
    }

    info!(
        "Generated {} pages into {}",
        written.len(),
        options.output.display()
    );
    Ok(written)
}

/// Pages for one document, in document order.
pub fn generate_files(
    document: &OpenApiDocument,
    document_ref: &str,
    stem: &str,
    options: &GenerateOptions,
) -> Vec<GeneratedFile> {
    let operations = document.operations();

    match options.per {
        Per::Operation => operations
            .iter()
            .map(|op| {
                let path = operation_file_path(op, options.group_by);
                let title = op.title();
                let frontmatter = PageFrontmatter {
                    title: &title,
                    description: op.description(),
                    full: true,
                    openapi: Some(OperationMeta {
                        method: op.method.to_string(),
                        route: op.path,
                    }),
                };
                GeneratedFile {
                    path,
                    content: page_content(&frontmatter, document_ref, &[*op], false, options),
                }
            })
            .collect(),
        Per::Tag => {
            let mut by_tag: BTreeMap<String, (String, Vec<OperationRef<'_>>)> = BTreeMap::new();
            for op in &operations {
                let tags: Vec<&str> = if op.operation.tags.is_empty() {
                    vec!["default"]
                } else {
                    op.operation.tags.iter().map(String::as_str).collect()
                };
                for tag in tags {
                    by_tag
                        .entry(slugify(tag))
                        .or_insert_with(|| (tag.to_string(), Vec::new()))
                        .1
                        .push(*op);
                }
            }

            by_tag
                .into_iter()
                .map(|(slug, (name, ops))| {
                    let description = document
                        .tags
                        .iter()
                        .find(|t| t.name == name)
                        .and_then(|t| t.description.as_deref());
                    let frontmatter = PageFrontmatter {
                        title: &name,
                        description,
                        full: true,
                        openapi: None,
                    };
                    GeneratedFile {
                        path: PathBuf::from(format!("{}.mdx", slug)),
                        content: page_content(&frontmatter, document_ref, &ops, true, options),
                    }
                })
                .collect()
        }
        Per::File => {
            let title = if document.info.title.is_empty() {
                stem
            } else {
                document.info.title.as_str()
            };
            let frontmatter = PageFrontmatter {
                title,
                description: document.info.description.as_deref(),
                full: true,
                openapi: None,
            };
            vec![GeneratedFile {
                path: PathBuf::from(format!("{}.mdx", slugify(stem))),
                content: page_content(&frontmatter, document_ref, &operations, true, options),
            }]
        }
    }
}

fn page_content(
    frontmatter: &PageFrontmatter<'_>,
    document_ref: &str,
    operations: &[OperationRef<'_>],
    has_head: bool,
    options: &GenerateOptions,
) -> String {
    // Serializing plain structs of strings and bools cannot fail
    let yaml = serde_yaml::to_string(frontmatter).unwrap_or_default();

    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&yaml);
    out.push_str("---\n\n");
    if options.add_generated_comment {
        out.push_str(GENERATED_COMMENT);
        out.push_str("\n\n");
    }
    out.push_str(&api_page_tag(document_ref, operations, has_head));
    out.push('\n');
    out
}

/// The `<APIPage>` tag naming a document and its operations.
pub fn api_page_tag(document_ref: &str, operations: &[OperationRef<'_>], has_head: bool) -> String {
    let ops: Vec<_> = operations
        .iter()
        .map(|op| json!({ "path": op.path, "method": op.method.as_str() }))
        .collect();

    format!(
        "<APIPage document={{{}}} operations={{{}}} webhooks={{[]}} hasHead={{{}}} />",
        json!(document_ref),
        serde_json::Value::Array(ops),
        has_head
    )
}

/// `./openapi.yaml` style reference used inside generated content.
pub fn document_ref(input: &Path) -> String {
    let text = input.to_string_lossy().replace('\\', "/");
    if text.starts_with("./") || text.starts_with("../") || text.starts_with('/') {
        text
    } else {
        format!("./{}", text)
    }
}

fn operation_file_path(op: &OperationRef<'_>, group_by: GroupBy) -> PathBuf {
    match group_by {
        GroupBy::Route => {
            let mut path: PathBuf = route_segments(op.path).into_iter().collect();
            path.push(format!("{}.mdx", op.method.as_str()));
            path
        }
        GroupBy::Tag => {
            let tag = op
                .operation
                .tags
                .first()
                .map(|t| slugify(t))
                .unwrap_or_else(|| "default".to_string());
            PathBuf::from(tag).join(format!("{}.mdx", operation_slug(op)))
        }
        GroupBy::None => PathBuf::from(format!("{}.mdx", operation_slug(op))),
    }
}

/// `/users/{id}` → `["users", "id"]`
fn route_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| slugify(s.trim_start_matches('{').trim_end_matches('}')))
        .filter(|s| !s.is_empty())
        .collect()
}

fn operation_slug(op: &OperationRef<'_>) -> String {
    match &op.operation.operation_id {
        Some(id) => slugify(id),
        None => {
            let mut parts = vec![op.method.as_str().to_string()];
            parts.extend(route_segments(op.path));
            parts.join("-")
        }
    }
}

/// Lowercase, with runs of other characters collapsed to `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
