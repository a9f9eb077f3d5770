//! OpenAPI document model, loading and lookup.
//!
//! Only the parts of OpenAPI 3 the reference pages display are typed; schemas
//! stay as raw JSON values.

pub mod generator;
pub mod render;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenApiDocument {
    #[serde(default)]
    pub openapi: String,
    #[serde(default)]
    pub info: Info,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub description: Option<String>,
}

/// Either an inline object or a `$ref` to one under `components`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Item(T),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    pub request_body: Option<RefOr<RequestBody>>,
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,
    #[serde(default)]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestBody {
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Option<Value>,
    pub example: Option<Value>,
}

/// HTTP methods in the order OpenAPI path items declare them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Put,
        Method::Post,
        Method::Delete,
        Method::Options,
        Method::Head,
        Method::Patch,
        Method::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Put => "put",
            Method::Post => "post",
            Method::Delete => "delete",
            Method::Options => "options",
            Method::Head => "head",
            Method::Patch => "patch",
            Method::Trace => "trace",
        }
    }

    pub fn parse(method: &str) -> Option<Method> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(method))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

impl PathItem {
    pub fn operation(&self, method: Method) -> Option<&Operation> {
        match method {
            Method::Get => self.get.as_ref(),
            Method::Put => self.put.as_ref(),
            Method::Post => self.post.as_ref(),
            Method::Delete => self.delete.as_ref(),
            Method::Options => self.options.as_ref(),
            Method::Head => self.head.as_ref(),
            Method::Patch => self.patch.as_ref(),
            Method::Trace => self.trace.as_ref(),
        }
    }

    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        Method::ALL
            .into_iter()
            .filter_map(move |m| self.operation(m).map(|op| (m, op)))
    }
}

/// One operation located in a document.
#[derive(Debug, Clone, Copy)]
pub struct OperationRef<'a> {
    pub path: &'a str,
    pub method: Method,
    pub path_item: &'a PathItem,
    pub operation: &'a Operation,
}

impl OperationRef<'_> {
    /// Summary, then operationId, then `METHOD /path`.
    pub fn title(&self) -> String {
        self.operation
            .summary
            .clone()
            .or_else(|| self.operation.operation_id.clone())
            .unwrap_or_else(|| format!("{} {}", self.method, self.path))
    }

    pub fn description(&self) -> Option<&str> {
        self.operation
            .description
            .as_deref()
            .or(self.path_item.description.as_deref())
    }
}

impl OpenApiDocument {
    /// Parse a document from YAML or JSON text.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse OpenAPI document")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read OpenAPI document {}", path.display()))?;
        let document = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse OpenAPI document {}", path.display()))?
        } else {
            Self::parse(&content)
                .with_context(|| format!("Failed to parse OpenAPI document {}", path.display()))?
        };
        Ok(document)
    }

    /// All operations in document order.
    pub fn operations(&self) -> Vec<OperationRef<'_>> {
        self.paths
            .iter()
            .flat_map(|(path, item)| {
                item.operations().map(move |(method, operation)| OperationRef {
                    path,
                    method,
                    path_item: item,
                    operation,
                })
            })
            .collect()
    }

    pub fn find_operation(&self, path: &str, method: Method) -> Option<OperationRef<'_>> {
        let (path, item) = self.paths.get_key_value(path)?;
        item.operation(method).map(|operation| OperationRef {
            path,
            method,
            path_item: item,
            operation,
        })
    }

    /// Resolve a local `#/components/...` pointer.
    pub fn resolve_pointer(&self, reference: &str) -> Option<&Value> {
        let pointer = reference.strip_prefix("#/components")?;
        self.components.as_ref()?.pointer(pointer)
    }

    /// Inline value of a [`RefOr`], following one `$ref` hop.
    pub fn resolve<T: DeserializeOwned + Clone>(&self, item: &RefOr<T>) -> Option<T> {
        match item {
            RefOr::Item(value) => Some(value.clone()),
            RefOr::Ref { reference } => self
                .resolve_pointer(reference)
                .and_then(|value| serde_json::from_value(value.clone()).ok()),
        }
    }

    /// Parameters of an operation, path-level ones first unless overridden.
    pub fn parameters(&self, op: &OperationRef<'_>) -> Vec<Parameter> {
        let own: Vec<Parameter> = op
            .operation
            .parameters
            .iter()
            .filter_map(|p| self.resolve(p))
            .collect();

        let mut params: Vec<Parameter> = op
            .path_item
            .parameters
            .iter()
            .filter_map(|p| self.resolve(p))
            .filter(|shared| {
                !own.iter()
                    .any(|p| p.name == shared.name && p.location == shared.location)
            })
            .collect();
        params.extend(own);
        params
    }

    /// JSON form of the document.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize OpenAPI document to JSON")
    }
}

/// Documents available to `<APIPage>` tags, keyed by the path they were
/// loaded from.
#[derive(Debug, Default)]
pub struct OpenApiRegistry {
    documents: HashMap<String, OpenApiDocument>,
}

impl OpenApiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every existing spec file; missing files are skipped with a log line.
    pub fn load(paths: &[PathBuf]) -> Result<Self> {
        let mut registry = Self::new();
        for path in paths {
            if !path.exists() {
                info!("OpenAPI document {} not found, skipping", path.display());
                continue;
            }
            let document = OpenApiDocument::from_path(path)?;
            info!(
                "Loaded OpenAPI document {} ({} paths)",
                path.display(),
                document.paths.len()
            );
            registry.insert(&path.to_string_lossy(), document);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, name: &str, document: OpenApiDocument) {
        self.documents.insert(normalize_document_name(name), document);
    }

    /// Look up by the name used in a content file, e.g. `./openapi.yaml`.
    ///
    /// Falls back to matching the file name alone, so content generated from
    /// a different working directory still resolves.
    pub fn get(&self, name: &str) -> Option<&OpenApiDocument> {
        let normalized = normalize_document_name(name);
        self.documents.get(&normalized).or_else(|| {
            let wanted = file_name(&normalized);
            self.documents
                .iter()
                .find(|(key, _)| file_name(key) == wanted)
                .map(|(_, doc)| doc)
        })
    }

    /// The only document, when exactly one is loaded.
    pub fn single(&self) -> Option<&OpenApiDocument> {
        match self.documents.len() {
            1 => self.documents.values().next(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn normalize_document_name(name: &str) -> String {
    let name = name.replace('\\', "/");
    name.strip_prefix("./").unwrap_or(&name).to_string()
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
