//! Locale registry: Single source of truth for all supported locales.
//!
//! The registry is a process-wide singleton initialised with `OnceLock` on first
//! access and immutable afterwards.

use std::sync::OnceLock;

use crate::i18n::Locale;

/// Configuration for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// The locale this entry describes
    pub locale: Locale,

    /// URL prefix and `lang` attribute value (e.g., "en", "ru", "uz")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Russian", "Uzbek")
    pub name: &'static str,

    /// Native name shown in the language switcher (e.g., "Русский")
    pub native_name: &'static str,

    /// Whether unprefixed requests fall back to this locale (only one should be true)
    pub is_default: bool,
}

/// Global locale registry singleton.
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: default_locales(),
        })
    }

    /// Get a locale configuration by its URL code.
    ///
    /// # Returns
    /// * `Some(&LocaleConfig)` if the code is supported
    /// * `None` otherwise
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|config| config.code == code)
    }

    /// Get the configuration of a typed locale.
    pub fn get_by_locale(&self, locale: Locale) -> Option<&LocaleConfig> {
        self.locales.iter().find(|config| config.locale == locale)
    }

    /// All locales in display order.
    pub fn list_all(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().collect()
    }

    /// Get the default locale configuration.
    ///
    /// # Panics
    /// Panics if the registry does not define exactly one default locale
    /// (this indicates a configuration error).
    pub fn default_locale(&self) -> &LocaleConfig {
        let defaults: Vec<_> = self.locales.iter().filter(|l| l.is_default).collect();

        match defaults.len() {
            0 => panic!("No default locale found in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default locales found in registry"),
        }
    }

    /// Check if a code names a supported locale.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

/// Default locale configurations, in switcher order.
fn default_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            locale: Locale::En,
            code: "en",
            name: "English",
            native_name: "English",
            is_default: true,
        },
        LocaleConfig {
            locale: Locale::Ru,
            code: "ru",
            name: "Russian",
            native_name: "Русский",
            is_default: false,
        },
        LocaleConfig {
            locale: Locale::Uz,
            code: "uz",
            name: "Uzbek",
            native_name: "O‘zbekcha",
            is_default: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LocaleRegistry::get();
        let registry2 = LocaleRegistry::get();

        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_russian() {
        let config = LocaleRegistry::get().get_by_code("ru").unwrap();

        assert_eq!(config.locale, Locale::Ru);
        assert_eq!(config.name, "Russian");
        assert_eq!(config.native_name, "Русский");
        assert!(!config.is_default);
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LocaleRegistry::get().get_by_code("fr").is_none());
        assert!(LocaleRegistry::get().get_by_code("").is_none());
    }

    #[test]
    fn test_every_locale_is_registered() {
        let registry = LocaleRegistry::get();
        for locale in Locale::ALL {
            let config = registry.get_by_locale(locale).unwrap();
            assert_eq!(config.code, locale.code());
        }
        assert_eq!(registry.list_all().len(), Locale::ALL.len());
    }

    #[test]
    fn test_default_locale_is_english() {
        let default = LocaleRegistry::get().default_locale();
        assert_eq!(default.code, "en");
    }

    #[test]
    fn test_is_supported() {
        let registry = LocaleRegistry::get();
        assert!(registry.is_supported("uz"));
        assert!(!registry.is_supported("UZ"));
        assert!(!registry.is_supported("docs"));
    }
}
