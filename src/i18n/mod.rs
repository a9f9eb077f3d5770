//! Internationalization (i18n) module for the documentation portal.
//!
//! All locale-related logic lives here: the set of supported locales, the UI
//! string tables and the completeness validation that runs at startup.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported locales and their metadata
//! - `locale`: Typed `Locale` enum used for URL prefixes and string lookup
//! - `strings`: Built-in UI string tables for every locale
//! - `translations`: The `Translations` object handed to the layouts
//! - `validator`: Completeness checks across locale tables
//!
//! # Example
//!
//! ```rust,ignore
//! use dvoice_docs::i18n::{Locale, Translations, UiKey};
//!
//! let translations = Translations::builtin()?;
//! let label = translations.get(Locale::Ru, UiKey::Toc);
//! assert_eq!(label, "Оглавление");
//! ```

mod locale;
mod registry;
mod strings;
mod translations;
mod validator;

pub use locale::{Locale, LocaleError};
pub use registry::{LocaleConfig, LocaleRegistry};
pub use strings::{builtin_table, UiKey};
pub use translations::{I18nError, Translations};
pub use validator::{TranslationValidator, ValidationReport};
