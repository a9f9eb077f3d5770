//! Locale type: the closed set of languages the portal is served in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::i18n::{LocaleConfig, LocaleRegistry};

/// Error returned when a string does not name a supported locale.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("Unknown locale code: '{0}'")]
    Unknown(String),
}

/// A supported locale.
///
/// Every value of this type has an entry in the [`LocaleRegistry`], so
/// lookups through it cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ru,
    Uz,
}

impl Locale {
    /// All locales, in the order they are listed in the switcher.
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Ru, Locale::Uz];

    /// Parse a URL code such as `"ru"`.
    ///
    /// Codes are matched exactly; `"RU"` is not a locale prefix.
    pub fn from_code(code: &str) -> Result<Locale, LocaleError> {
        LocaleRegistry::get()
            .get_by_code(code)
            .map(|config| config.locale)
            .ok_or_else(|| LocaleError::Unknown(code.to_string()))
    }

    /// The locale unprefixed requests fall back to.
    pub fn default_locale() -> Locale {
        LocaleRegistry::get().default_locale().locale
    }

    /// URL prefix and `lang` attribute value.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
            Locale::Uz => "uz",
        }
    }

    /// Full registry entry for this locale.
    ///
    /// # Panics
    /// Panics if the registry lost an entry for a declared variant, which is
    /// covered by the registry tests.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_locale(*self)
            .expect("every Locale variant is registered")
    }

    /// English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Native name of the language.
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_default(&self) -> bool {
        self.config().is_default
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_code(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_all_locales() {
        assert_eq!(Locale::from_code("en").unwrap(), Locale::En);
        assert_eq!(Locale::from_code("ru").unwrap(), Locale::Ru);
        assert_eq!(Locale::from_code("uz").unwrap(), Locale::Uz);
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Locale::from_code("fr");
        assert_eq!(result, Err(LocaleError::Unknown("fr".to_string())));
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_is_case_sensitive() {
        assert!(Locale::from_code("EN").is_err());
        assert!(Locale::from_code("").is_err());
    }

    #[test]
    fn test_default_locale() {
        assert_eq!(Locale::default_locale(), Locale::En);
        assert!(Locale::En.is_default());
        assert!(!Locale::Uz.is_default());
    }

    #[test]
    fn test_code_matches_registry() {
        for locale in Locale::ALL {
            assert_eq!(locale.code(), locale.config().code);
        }
    }

    #[test]
    fn test_native_names() {
        assert_eq!(Locale::En.native_name(), "English");
        assert_eq!(Locale::Ru.native_name(), "Русский");
        assert_eq!(Locale::Uz.native_name(), "O‘zbekcha");
        assert_eq!(Locale::Uz.name(), "Uzbek");
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(Locale::Ru.to_string(), "ru");
        assert_eq!("uz".parse::<Locale>().unwrap(), Locale::Uz);
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Locale::Ru).unwrap(), "\"ru\"");
        let parsed: Locale = serde_json::from_str("\"uz\"").unwrap();
        assert_eq!(parsed, Locale::Uz);
    }
}
