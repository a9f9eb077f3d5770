//! Translation table validation.
//!
//! Checks that every locale carries every UI key. Missing keys are errors;
//! blank strings and untranslated copies of the default locale are warnings.

use std::collections::{BTreeMap, HashMap};

use crate::i18n::{Locale, UiKey};

/// Validation report for a set of translation tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Keys absent from a locale's table
    pub missing: BTreeMap<Locale, Vec<UiKey>>,

    /// Non-critical warnings about potential issues
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        !self.missing.is_empty()
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Validator for locale string tables.
pub struct TranslationValidator;

impl TranslationValidator {
    /// Validate tables for every supported locale.
    ///
    /// A locale with no table at all is reported as missing every key.
    pub fn validate(tables: &HashMap<Locale, HashMap<UiKey, String>>) -> ValidationReport {
        let mut report = ValidationReport::new();
        let default = Locale::default_locale();

        for locale in Locale::ALL {
            let table = tables.get(&locale);

            let missing: Vec<UiKey> = UiKey::ALL
                .into_iter()
                .filter(|key| table.map_or(true, |t| !t.contains_key(key)))
                .collect();
            if !missing.is_empty() {
                report.missing.insert(locale, missing);
            }

            let Some(table) = table else { continue };

            for key in UiKey::ALL {
                let Some(text) = table.get(&key) else { continue };

                if text.trim().is_empty() {
                    report
                        .warnings
                        .push(format!("{}: '{}' is blank", locale, key));
                } else if locale != default
                    && tables
                        .get(&default)
                        .and_then(|t| t.get(&key))
                        .is_some_and(|canonical| canonical == text)
                {
                    report.warnings.push(format!(
                        "{}: '{}' is identical to the {} text",
                        locale, key, default
                    ));
                }
            }
        }

        report
    }
}
