//! Integration tests for the documentation portal
//!
//! These tests build a content tree in a temporary directory, generate the
//! API reference pages from an OpenAPI document and drive the router with
//! `tower::ServiceExt::oneshot`.

use std::fs;
use std::path::Path;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use dvoice_docs::{
    config::Config,
    i18n::Locale,
    openapi::generator::{generate, GenerateOptions},
    server::{build_app, AppState},
};

// ==================== Test Helpers ====================

const OPENAPI: &str = r#"
openapi: 3.0.3
info:
  title: Dvoice API
  version: 1.0.0
servers:
  - url: https://api.dvoice.example
paths:
  /users:
    get:
      summary: List users
      tags: [Users]
      responses:
        '200':
          description: A list of users
  /users/{id}:
    get:
      summary: Get user
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        '200':
          description: One user
"#;

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

/// Content for en and ru, an OpenAPI document and its generated pages
fn create_fixture() -> (TempDir, Config) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let root = dir.path();

    write(
        root,
        "content/docs/en/1-index.mdx",
        "---\ntitle: Introduction\ndescription: Welcome to Dvoice\n---\n## Voice recognition\n\nDvoice turns speech into text.\n\n<Callout type=\"warn\">\nKeep your API key secret.\n</Callout>\n",
    );
    write(
        root,
        "content/docs/en/2-usage.mdx",
        "---\ntitle: Usage\n---\nSend audio to the API.\n",
    );
    write(
        root,
        "content/docs/ru/1-index.mdx",
        "---\ntitle: Введение\n---\n## Распознавание речи\n\nDvoice превращает речь в текст.\n",
    );
    write(root, "openapi.yaml", OPENAPI);
    write(root, "specs/extra.yaml", OPENAPI);

    let config = Config {
        content_dir: root.join("content/docs"),
        openapi_spec: root.join("openapi.yaml"),
        specs_dir: root.join("specs"),
        ..Config::default()
    };

    generate(&GenerateOptions {
        inputs: vec![config.openapi_spec.clone()],
        output: root.join("content/docs/en/api"),
        ..GenerateOptions::default()
    })
    .expect("Failed to generate API pages");

    (dir, config)
}

fn create_app() -> (TempDir, Router) {
    let (dir, config) = create_fixture();
    let state = AppState::load(config).expect("Failed to load state");
    (dir, build_app(state))
}

async fn get(app: Router, uri: &str) -> Response {
    get_with(app, uri, None).await
}

async fn get_with(app: Router, uri: &str, accept_language: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(value) = accept_language {
        request = request.header(header::ACCEPT_LANGUAGE, value);
    }
    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

// ==================== Redirect Tests ====================

#[tokio::test]
async fn test_root_redirects_to_default_page() {
    let (_dir, app) = create_app();
    let response = get(app, "/").await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/docs/1-index");
}

#[tokio::test]
async fn test_unprefixed_path_redirects_to_default_locale() {
    let (_dir, app) = create_app();
    let response = get(app, "/docs/1-index").await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/en/docs/1-index");
}

#[tokio::test]
async fn test_unprefixed_path_uses_accept_language() {
    let (_dir, app) = create_app();
    let response = get_with(app, "/docs/2-usage?tab=curl", Some("ru-RU,ru;q=0.9,en;q=0.8")).await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/ru/docs/2-usage?tab=curl");
}

#[tokio::test]
async fn test_locale_root_redirects_to_default_page() {
    let (_dir, app) = create_app();
    let response = get(app, "/uz").await;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/uz/docs/1-index");
}

#[tokio::test]
async fn test_excluded_paths_are_not_rewritten() {
    let (_dir, app) = create_app();

    for uri in ["/openapi.yaml", "/openapi.json", "/api/search?query=x", "/api/health", "/_static/global.css", "/specs/extra.yaml"] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{} should be served directly", uri);
        assert!(response.headers().get(header::LOCATION).is_none());
    }
}

#[tokio::test]
async fn test_trailing_slash_is_trimmed() {
    let (_dir, app) = create_app();

    let response = get(app.clone(), "/en/docs/").await;
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(location(&response), "/en/docs");

    let response = get(app, "/ru/search/?query=x").await;
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(location(&response), "/ru/search?query=x");
}

#[tokio::test]
async fn test_trailing_slash_never_redirects_off_site() {
    let (_dir, app) = create_app();
    let response = get(app, "//evil.example/").await;

    assert!(!location(&response).starts_with("//"));
}

#[tokio::test]
async fn test_fallback_follows_configured_default_locale() {
    let (_dir, config) = create_fixture();
    let config = Config {
        default_locale: Locale::Ru,
        ..config
    };
    let app = build_app(AppState::load(config).expect("Failed to load state"));

    let response = get(app, "/uz/docs/1-index").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h1>Введение</h1>"));
}

// ==================== Page Rendering Tests ====================

#[tokio::test]
async fn test_page_renders_with_layout() {
    let (_dir, app) = create_app();
    let response = get(app, "/en/docs/1-index").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<html lang=\"en\">"));
    assert!(html.contains("<h1>Introduction</h1>"));
    assert!(html.contains("<h2 id=\"voice-recognition\">Voice recognition</h2>"));
    assert!(html.contains("callout-warn"));
    assert!(html.contains("Table of Contents"));
    assert!(html.contains("href=\"/en/docs/2-usage\""));
    assert!(html.contains("data-language-switcher"));
}

#[tokio::test]
async fn test_translated_page_uses_locale_strings() {
    let (_dir, app) = create_app();
    let response = get(app, "/ru/docs/1-index").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<html lang=\"ru\">"));
    assert!(html.contains("<h1>Введение</h1>"));
    assert!(html.contains("Оглавление"));
    assert!(html.contains("<option value=\"/en/docs/1-index\" lang=\"en\">"));
}

#[tokio::test]
async fn test_generated_api_page_renders_for_every_locale() {
    let (_dir, app) = create_app();

    for uri in ["/en/docs/api/users/id/get", "/uz/docs/api/users/id/get"] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);

        let html = body_text(response).await;
        assert!(html.contains("<h1>Get user</h1>"));
        assert!(html.contains("api-operation"));
        assert!(html.contains("<code>https://api.dvoice.example/users/{id}</code>"));
        assert!(!html.contains("APIPage"));
    }
}

#[tokio::test]
async fn test_missing_page_is_localized_404() {
    let (_dir, app) = create_app();
    let response = get(app, "/uz/docs/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("Sahifa topilmadi"));
}

// ==================== Search Tests ====================

#[tokio::test]
async fn test_search_returns_json_results() {
    let (_dir, app) = create_app();
    let response = get(app, "/api/search?query=speech&locale=en").await;

    assert_eq!(response.status(), StatusCode::OK);
    let results: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    let first = &results.as_array().unwrap()[0];
    assert_eq!(first["type"], "text");
    assert_eq!(first["url"], "/en/docs/1-index#voice-recognition");
}

#[tokio::test]
async fn test_locale_search_route() {
    let (_dir, app) = create_app();
    let response = get(app, "/ru/search?query=%D1%80%D0%B5%D1%87%D0%B8").await;

    assert_eq!(response.status(), StatusCode::OK);
    let results: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(!results.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_search_query() {
    let (_dir, app) = create_app();
    let response = get(app, "/api/search?query=").await;

    assert_eq!(body_text(response).await, "[]");
}

#[tokio::test]
async fn test_search_unknown_locale_is_bad_request() {
    let (_dir, app) = create_app();
    let response = get(app, "/api/search?query=voice&locale=fr").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ==================== OpenAPI Tests ====================

#[tokio::test]
async fn test_openapi_json_conversion() {
    let (_dir, app) = create_app();
    let response = get(app, "/openapi.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["info"]["title"], "Dvoice API");
    assert!(json["paths"]["/users/{id}"]["get"].is_object());
}

#[test]
fn test_regeneration_is_byte_identical() {
    let (dir, _config) = create_fixture();
    let output = dir.path().join("content/docs/en/api");
    let first = fs::read(output.join("users/id/get.mdx")).unwrap();

    let written = generate(&GenerateOptions {
        inputs: vec![dir.path().join("openapi.yaml")],
        output: output.clone(),
        ..GenerateOptions::default()
    })
    .unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(fs::read(output.join("users/id/get.mdx")).unwrap(), first);
}

#[test]
fn test_malformed_spec_aborts_generation() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broken.yaml", "paths: [unclosed");

    let result = generate(&GenerateOptions {
        inputs: vec![dir.path().join("broken.yaml")],
        output: dir.path().join("out"),
        ..GenerateOptions::default()
    });

    assert!(result.is_err());
    assert!(!dir.path().join("out").exists());
}
