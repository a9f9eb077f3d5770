//! HTTP server: routes, shared state and handlers.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode, Uri},
    middleware,
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::config::Config;
use crate::i18n::{Locale, Translations};
use crate::icons::IconRegistry;
use crate::layout::{self, DocsPage, GLOBAL_CSS};
use crate::mdx::{ComponentRegistry, RenderContext};
use crate::middleware::{locale_redirect, LocaleRouting};
use crate::openapi::OpenApiRegistry;
use crate::search::{SearchIndex, SearchResult};
use crate::source::{PageTree, Source};

/// Immutable application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub translations: Arc<Translations>,
    pub icons: Arc<IconRegistry>,
    pub source: Arc<Source>,
    pub components: Arc<ComponentRegistry>,
    pub openapi: Arc<OpenApiRegistry>,
    pub search: Arc<SearchIndex>,
}

impl AppState {
    /// Load content, translations and OpenAPI documents named by `config`.
    pub fn load(config: Config) -> Result<Self> {
        let translations = match &config.translations_file {
            Some(path) => Translations::builtin_with_overrides(path)?,
            None => Translations::builtin().context("Built-in translations are incomplete")?,
        };

        let icons = IconRegistry::builtin();
        let source = Source::load_with_fallback(
            &config.content_dir,
            config.default_locale,
            &config.site_title,
            &icons,
        )
            .with_context(|| format!("Failed to load content from {}", config.content_dir.display()))?;

        let mut spec_paths = vec![config.openapi_spec.clone()];
        spec_paths.extend(spec_files(&config.specs_dir));
        let openapi = OpenApiRegistry::load(&spec_paths)?;

        let search = SearchIndex::build(&source);

        Ok(Self {
            config: Arc::new(config),
            translations: Arc::new(translations),
            icons: Arc::new(icons),
            source: Arc::new(source),
            components: Arc::new(ComponentRegistry::with_defaults()),
            openapi: Arc::new(openapi),
            search: Arc::new(search),
        })
    }

    fn render_context(&self, locale: Locale) -> RenderContext<'_> {
        RenderContext {
            locale,
            openapi: &self.openapi,
            icons: self.icons.as_ref(),
        }
    }
}

/// OpenAPI documents kept next to the main spec.
fn spec_files(dir: &FsPath) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| matches!(e, "yaml" | "yml" | "json"))
        })
        .collect()
}

/// Handler error rendered as a plain 500.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Build the router with every route, the locale middleware and request tracing.
pub fn build_app(state: AppState) -> Router {
    let routing = LocaleRouting::new(state.config.default_locale);
    let specs = ServeDir::new(&state.config.specs_dir);

    Router::new()
        .route("/", get(root_redirect))
        .route("/api/health", get(health))
        .route("/api/search", get(api_search))
        .route("/openapi.yaml", get(openapi_yaml))
        .route("/openapi.json", get(openapi_json))
        .route("/_static/global.css", get(global_css))
        .nest_service("/specs", specs)
        .route("/:lang", get(locale_root))
        .route("/:lang/docs", get(docs_index))
        .route("/:lang/docs/*slug", get(docs_page))
        .route("/:lang/search", get(locale_search))
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(routing, locale_redirect))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on http://{}", addr);
    axum::serve(listener, build_app(state))
        .await
        .context("Server error")?;
    Ok(())
}

// ==================== Handlers ====================

async fn root_redirect(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.config.default_page)
}

async fn health() -> &'static str {
    "ok"
}

async fn locale_root(State(state): State<AppState>, Path(lang): Path<String>) -> Response {
    match Locale::from_code(&lang) {
        Ok(locale) => {
            Redirect::temporary(&format!("/{}{}", locale.code(), state.config.default_page)).into_response()
        }
        Err(_) => not_found(&state, state.config.default_locale, &format!("/{}", lang)),
    }
}

async fn docs_index(
    State(state): State<AppState>,
    Path(lang): Path<String>,
    uri: Uri,
) -> Result<Response, AppError> {
    render_docs_page(&state, &lang, "", uri.path())
}

async fn docs_page(
    State(state): State<AppState>,
    Path((lang, slug)): Path<(String, String)>,
    uri: Uri,
) -> Result<Response, AppError> {
    render_docs_page(&state, &lang, &slug, uri.path())
}

fn render_docs_page(state: &AppState, lang: &str, slug: &str, path: &str) -> Result<Response, AppError> {
    let Ok(locale) = Locale::from_code(lang) else {
        return Ok(not_found(state, state.config.default_locale, path));
    };
    let slugs: Vec<&str> = slug.split('/').filter(|s| !s.is_empty()).collect();
    let Some(page) = state.source.get_page(locale, &slugs) else {
        debug!("No page for {}", path);
        return Ok(not_found(state, locale, path));
    };

    let rendered = state
        .components
        .render_page(&page.body, &state.render_context(locale))
        .with_context(|| format!("Failed to render {}", page.path.display()))?;

    let url = page.url(locale);
    let neighbours = state.source.neighbours(locale, &url);
    let empty = PageTree::default();
    let html = layout::render_docs(
        &state.config,
        state.source.page_tree(locale).unwrap_or(&empty),
        &state.translations,
        &DocsPage {
            locale,
            path: &url,
            title: &page.title,
            description: page.description.as_deref(),
            body_html: &rendered.html,
            toc: &rendered.toc,
            last_modified: page.last_modified,
            neighbours: &neighbours,
            full: page.full,
        },
    );
    Ok(Html(html).into_response())
}

fn not_found(state: &AppState, locale: Locale, path: &str) -> Response {
    let empty = PageTree::default();
    let tree = state.source.page_tree(locale).unwrap_or(&empty);
    let html = layout::render_not_found(&state.config, tree, &state.translations, locale, path);
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}

async fn fallback(State(state): State<AppState>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    // A leading `//` would turn the Location into another host
    if path.len() > 1 && path.ends_with('/') && !path.starts_with("//") {
        let mut target = path.trim_end_matches('/').to_string();
        if let Some(query) = request.uri().query() {
            target.push('?');
            target.push_str(query);
        }
        return Redirect::permanent(&target).into_response();
    }
    let locale = crate::switcher::LocalizedPath::parse(&path)
        .locale
        .unwrap_or(state.config.default_locale);
    not_found(&state, locale, &path)
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub locale: Option<String>,
}

async fn locale_search(
    State(state): State<AppState>,
    Path(lang): Path<String>,
    Query(params): Query<SearchParams>,
) -> Response {
    match Locale::from_code(&lang) {
        Ok(locale) => Json(state.search.search(locale, &params.query)).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn api_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>, (StatusCode, String)> {
    let locale = match params.locale.as_deref() {
        Some(code) => Locale::from_code(code).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?,
        None => state.config.default_locale,
    };
    Ok(Json(state.search.search(locale, &params.query)))
}

async fn openapi_yaml(State(state): State<AppState>) -> Response {
    match tokio::fs::read_to_string(&state.config.openapi_spec).await {
        Ok(content) => ([(header::CONTENT_TYPE, "application/yaml")], content).into_response(),
        Err(err) => {
            debug!("OpenAPI spec {} unavailable: {}", state.config.openapi_spec.display(), err);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn openapi_json(State(state): State<AppState>) -> Result<Response, AppError> {
    let name = state.config.openapi_spec.to_string_lossy();
    let Some(document) = state.openapi.get(&name) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    let json = document.to_json_pretty()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], json).into_response())
}

async fn global_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], GLOBAL_CSS)
}
