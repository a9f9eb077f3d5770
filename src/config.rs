use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::i18n::Locale;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Content
    pub content_dir: PathBuf,
    pub openapi_spec: PathBuf,
    pub specs_dir: PathBuf,

    // Routing
    pub default_page: String,
    pub default_locale: Locale,

    // Layout
    pub site_title: String,
    pub home_path: String,

    // i18n
    pub translations_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: match std::env::var("PORT") {
                Ok(v) => v.parse().with_context(|| format!("Invalid PORT: {}", v))?,
                Err(_) => 3000,
            },

            content_dir: std::env::var("CONTENT_DIR")
                .unwrap_or_else(|_| "content/docs".to_string())
                .into(),
            openapi_spec: std::env::var("OPENAPI_SPEC")
                .unwrap_or_else(|_| "openapi.yaml".to_string())
                .into(),
            specs_dir: std::env::var("SPECS_DIR")
                .unwrap_or_else(|_| "specs".to_string())
                .into(),

            default_page: normalize_path(
                &std::env::var("DEFAULT_PAGE").unwrap_or_else(|_| "/docs/1-index".to_string()),
            ),
            default_locale: match std::env::var("DEFAULT_LOCALE") {
                Ok(code) => Locale::from_code(&code).context("Invalid DEFAULT_LOCALE")?,
                Err(_) => Locale::default_locale(),
            },

            site_title: std::env::var("SITE_TITLE").unwrap_or_else(|_| "Dvoice".to_string()),
            home_path: normalize_path(
                &std::env::var("HOME_PATH")
                    .unwrap_or_else(|_| "/docs/documentation/get-started/overview".to_string()),
            ),

            translations_file: std::env::var("TRANSLATIONS_FILE").ok().map(PathBuf::from),
        })
    }

    /// Home link of the nav title for a locale.
    pub fn home_url(&self, locale: Locale) -> String {
        format!("/{}{}", locale.code(), self.home_path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            content_dir: "content/docs".into(),
            openapi_spec: "openapi.yaml".into(),
            specs_dir: "specs".into(),
            default_page: "/docs/1-index".to_string(),
            default_locale: Locale::default_locale(),
            site_title: "Dvoice".to_string(),
            home_path: "/docs/documentation/get-started/overview".to_string(),
            translations_file: None,
        }
    }
}

/// Ensure a leading slash and drop a trailing one.
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    format!("/{}", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "PORT",
        "CONTENT_DIR",
        "OPENAPI_SPEC",
        "SPECS_DIR",
        "DEFAULT_PAGE",
        "DEFAULT_LOCALE",
        "SITE_TITLE",
        "HOME_PATH",
        "TRANSLATIONS_FILE",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.content_dir, PathBuf::from("content/docs"));
        assert_eq!(config.openapi_spec, PathBuf::from("openapi.yaml"));
        assert_eq!(config.default_page, "/docs/1-index");
        assert_eq!(config.default_locale, Locale::En);
        assert_eq!(config.site_title, "Dvoice");
        assert!(config.translations_file.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("PORT", "8080");
        std::env::set_var("DEFAULT_PAGE", "docs/intro/");
        std::env::set_var("DEFAULT_LOCALE", "uz");

        let config = Config::from_env().unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.default_page, "/docs/intro");
        assert_eq!(config.default_locale, Locale::Uz);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unknown_locale() {
        clear_env();
        std::env::set_var("DEFAULT_LOCALE", "de");

        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_port() {
        clear_env();
        std::env::set_var("PORT", "eighty");

        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    fn test_home_url_is_locale_prefixed() {
        let config = Config::default();
        assert_eq!(
            config.home_url(Locale::Ru),
            "/ru/docs/documentation/get-started/overview"
        );
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("docs/1-index"), "/docs/1-index");
        assert_eq!(normalize_path("/docs/"), "/docs");
    }
}
