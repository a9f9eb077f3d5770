//! Locale middleware: redirects unprefixed requests to a locale-prefixed path.

use axum::{
    extract::{Request, State},
    http::header::ACCEPT_LANGUAGE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::i18n::Locale;
use crate::switcher::LocalizedPath;

/// Path prefixes that are never locale-rewritten.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "api",
    "_static",
    "_next/static",
    "_next/image",
    "favicon.ico",
    "openapi.yaml",
    "openapi.json",
    "specs/",
];

/// Matches paths that bypass locale negotiation.
///
/// A path is excluded when the text after its leading slash starts with one
/// of the configured prefixes, so `api` covers `/api/search` as well as
/// `/apidocs`.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: Regex,
}

impl PathMatcher {
    pub fn new(prefixes: &[&str]) -> Result<Self> {
        let alternatives: Vec<String> = prefixes.iter().map(|p| regex::escape(p)).collect();
        let pattern = Regex::new(&format!("^/(?:{})", alternatives.join("|")))
            .context("Failed to build path exclusion pattern")?;
        Ok(Self { pattern })
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

impl Default for PathMatcher {
    fn default() -> Self {
        // The default prefixes are literal and always form a valid pattern
        Self::new(DEFAULT_EXCLUSIONS).expect("default exclusion pattern is valid")
    }
}

/// State of the locale middleware.
#[derive(Debug, Clone)]
pub struct LocaleRouting {
    pub matcher: PathMatcher,
    pub default_locale: Locale,
}

impl LocaleRouting {
    pub fn new(default_locale: Locale) -> Self {
        Self {
            matcher: PathMatcher::default(),
            default_locale,
        }
    }

    /// Where an unprefixed request should go, or `None` to pass it through.
    pub fn redirect_target(
        &self,
        path: &str,
        query: Option<&str>,
        accept_language: Option<&str>,
    ) -> Option<String> {
        // "/" has its own redirect to the default page
        if path == "/" || self.matcher.is_excluded(path) {
            return None;
        }

        let parsed = LocalizedPath::parse(path);
        if parsed.locale.is_some() {
            return None;
        }

        let locale = negotiate_locale(accept_language, self.default_locale);
        let mut target = parsed.with_locale(locale);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        Some(target)
    }
}

/// Pick the best supported locale from an `Accept-Language` header.
///
/// Entries are tried in descending quality; the primary subtag decides the
/// match (`ru-RU` selects `ru`). Falls back to `default` when nothing matches.
pub fn negotiate_locale(accept_language: Option<&str>, default: Locale) -> Locale {
    let Some(header) = accept_language else {
        return default;
    };

    let mut ranges: Vec<(f32, &str)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let quality = parts
                .find_map(|p| p.trim().strip_prefix("q="))
                .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
                .unwrap_or(1.0);
            (quality > 0.0).then_some((quality, tag))
        })
        .collect();

    // Stable sort keeps header order among equal qualities
    ranges.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    for (_, tag) in ranges {
        if tag == "*" {
            return default;
        }
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or(tag)
            .to_ascii_lowercase();
        if let Ok(locale) = Locale::from_code(&primary) {
            return locale;
        }
    }

    default
}

/// axum middleware applying [`LocaleRouting`].
pub async fn locale_redirect(
    State(routing): State<LocaleRouting>,
    request: Request,
    next: Next,
) -> Response {
    let accept_language = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());

    match routing.redirect_target(request.uri().path(), request.uri().query(), accept_language) {
        Some(target) => {
            debug!("Redirecting {} to {}", request.uri(), target);
            Redirect::temporary(&target).into_response()
        }
        None => next.run(request).await,
    }
}
