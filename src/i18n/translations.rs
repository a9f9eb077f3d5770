//! The translation object passed to the layouts.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{info, warn};

use crate::i18n::{builtin_table, Locale, LocaleError, TranslationValidator, UiKey};

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("locale '{locale}' is missing translation keys: {}", keys.join(", "))]
    MissingKeys {
        locale: Locale,
        keys: Vec<&'static str>,
    },

    #[error("unknown translation key '{0}'")]
    UnknownKey(String),

    #[error(transparent)]
    UnknownLocale(#[from] LocaleError),
}

/// Complete UI string tables for every supported locale.
///
/// A value of this type can only be built from tables that passed the
/// completeness check, so [`Translations::get`] always finds its key.
#[derive(Debug, Clone)]
pub struct Translations {
    tables: HashMap<Locale, HashMap<UiKey, String>>,
}

impl Translations {
    /// Translations from the built-in tables.
    pub fn builtin() -> Result<Self, I18nError> {
        Self::from_tables(builtin_tables())
    }

    /// Build from arbitrary tables, failing on the first locale missing a key.
    pub fn from_tables(tables: HashMap<Locale, HashMap<UiKey, String>>) -> Result<Self, I18nError> {
        let report = TranslationValidator::validate(&tables);

        for warning in &report.warnings {
            warn!("Translation warning: {}", warning);
        }

        if let Some((locale, keys)) = report.missing.into_iter().next() {
            return Err(I18nError::MissingKeys {
                locale,
                keys: keys.iter().map(UiKey::as_str).collect(),
            });
        }

        Ok(Self { tables })
    }

    /// Built-in tables with overrides from a JSON file applied on top.
    ///
    /// The file maps locale codes to `{ key: text }` objects. Unknown locale
    /// codes or keys are rejected so typos do not go unnoticed.
    pub fn builtin_with_overrides(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read translations file {}", path.display()))?;
        let overrides: BTreeMap<String, BTreeMap<String, String>> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse translations file {}", path.display()))?;

        let mut tables = builtin_tables();
        let mut applied = 0usize;

        for (code, entries) in overrides {
            let locale = Locale::from_code(&code).map_err(I18nError::from)?;
            let table = tables.entry(locale).or_default();
            for (key, text) in entries {
                table.insert(key.parse::<UiKey>()?, text);
                applied += 1;
            }
        }

        info!("Applied {} translation overrides from {}", applied, path.display());
        Ok(Self::from_tables(tables)?)
    }

    /// Text for a key in a locale.
    pub fn get(&self, locale: Locale, key: UiKey) -> &str {
        self.tables
            .get(&locale)
            .and_then(|table| table.get(&key))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Table of a locale keyed by client-side key names, for embedding as JSON.
    pub fn table(&self, locale: Locale) -> BTreeMap<&'static str, &str> {
        UiKey::ALL
            .into_iter()
            .map(|key| (key.as_str(), self.get(locale, key)))
            .collect()
    }
}

fn builtin_tables() -> HashMap<Locale, HashMap<UiKey, String>> {
    Locale::ALL
        .into_iter()
        .map(|locale| {
            let table = builtin_table(locale)
                .iter()
                .map(|(key, text)| (*key, text.to_string()))
                .collect();
            (locale, table)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_is_complete() {
        let translations = Translations::builtin().unwrap();

        assert_eq!(translations.get(Locale::En, UiKey::Toc), "Table of Contents");
        assert_eq!(translations.get(Locale::Ru, UiKey::Search), "Поиск");
        assert_eq!(translations.get(Locale::Uz, UiKey::NextPage), "Keyingi sahifa");
    }

    #[test]
    fn test_table_has_every_key_for_every_locale() {
        let translations = Translations::builtin().unwrap();
        let english: Vec<_> = translations.table(Locale::En).into_keys().collect();

        for locale in Locale::ALL {
            let keys: Vec<_> = translations.table(locale).into_keys().collect();
            assert_eq!(keys, english);
            assert_eq!(keys.len(), UiKey::ALL.len());
        }
    }

    #[test]
    fn test_from_tables_fails_fast_on_missing_key() {
        let mut tables = builtin_tables();
        tables.get_mut(&Locale::Ru).unwrap().remove(&UiKey::LastUpdate);

        let err = Translations::from_tables(tables).unwrap_err();

        match err {
            I18nError::MissingKeys { locale, keys } => {
                assert_eq!(locale, Locale::Ru);
                assert_eq!(keys, vec!["lastUpdate"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overrides_file_replaces_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("translations.json");
        std::fs::write(&path, r#"{"uz": {"search": "Izlash"}}"#).unwrap();

        let translations = Translations::builtin_with_overrides(&path).unwrap();

        assert_eq!(translations.get(Locale::Uz, UiKey::Search), "Izlash");
        assert_eq!(translations.get(Locale::En, UiKey::Search), "Search");
    }

    #[test]
    fn test_overrides_file_rejects_unknown_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("translations.json");
        std::fs::write(&path, r#"{"en": {"searchBox": "Find"}}"#).unwrap();

        let err = Translations::builtin_with_overrides(&path).unwrap_err();
        assert!(err.to_string().contains("searchBox"));
    }

    #[test]
    fn test_overrides_file_rejects_unknown_locale() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("translations.json");
        std::fs::write(&path, r#"{"de": {"search": "Suche"}}"#).unwrap();

        assert!(Translations::builtin_with_overrides(&path).is_err());
    }
}
