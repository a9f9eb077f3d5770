//! Built-in UI string tables.
//!
//! Tables are plain data rather than structs so that a table missing a key is
//! representable and caught by the startup validation instead of at render time.

use std::fmt;
use std::str::FromStr;

use crate::i18n::{I18nError, Locale};

/// Keys of every user-facing UI string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UiKey {
    Toc,
    Search,
    LastUpdate,
    SearchNoResult,
    PreviousPage,
    NextPage,
    ChooseLanguage,
    PageNotFound,
}

impl UiKey {
    pub const ALL: [UiKey; 8] = [
        UiKey::Toc,
        UiKey::Search,
        UiKey::LastUpdate,
        UiKey::SearchNoResult,
        UiKey::PreviousPage,
        UiKey::NextPage,
        UiKey::ChooseLanguage,
        UiKey::PageNotFound,
    ];

    /// Key name as it appears in the client-side string table and override files.
    pub fn as_str(&self) -> &'static str {
        match self {
            UiKey::Toc => "toc",
            UiKey::Search => "search",
            UiKey::LastUpdate => "lastUpdate",
            UiKey::SearchNoResult => "searchNoResult",
            UiKey::PreviousPage => "previousPage",
            UiKey::NextPage => "nextPage",
            UiKey::ChooseLanguage => "chooseLanguage",
            UiKey::PageNotFound => "pageNotFound",
        }
    }
}

impl fmt::Display for UiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiKey {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UiKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| I18nError::UnknownKey(s.to_string()))
    }
}

// ==================== English Strings ====================

const ENGLISH_STRINGS: &[(UiKey, &str)] = &[
    (UiKey::Toc, "Table of Contents"),
    (UiKey::Search, "Search"),
    (UiKey::LastUpdate, "Last update"),
    (UiKey::SearchNoResult, "No results found"),
    (UiKey::PreviousPage, "Previous page"),
    (UiKey::NextPage, "Next page"),
    (UiKey::ChooseLanguage, "Choose language"),
    (UiKey::PageNotFound, "Page not found"),
];

// ==================== Russian Strings ====================

const RUSSIAN_STRINGS: &[(UiKey, &str)] = &[
    (UiKey::Toc, "Оглавление"),
    (UiKey::Search, "Поиск"),
    (UiKey::LastUpdate, "Последнее обновление"),
    (UiKey::SearchNoResult, "Результаты не найдены"),
    (UiKey::PreviousPage, "Предыдущая страница"),
    (UiKey::NextPage, "Следующая страница"),
    (UiKey::ChooseLanguage, "Выбрать язык"),
    (UiKey::PageNotFound, "Страница не найдена"),
];

// ==================== Uzbek Strings ====================

const UZBEK_STRINGS: &[(UiKey, &str)] = &[
    (UiKey::Toc, "Mundarija"),
    (UiKey::Search, "Qidirish"),
    (UiKey::LastUpdate, "Oxirgi yangilanish"),
    (UiKey::SearchNoResult, "Hech qanday natija topilmadi"),
    (UiKey::PreviousPage, "Oldingi sahifa"),
    (UiKey::NextPage, "Keyingi sahifa"),
    (UiKey::ChooseLanguage, "Tilni tanlang"),
    (UiKey::PageNotFound, "Sahifa topilmadi"),
];

/// Built-in string table for a locale.
pub fn builtin_table(locale: Locale) -> &'static [(UiKey, &'static str)] {
    match locale {
        Locale::En => ENGLISH_STRINGS,
        Locale::Ru => RUSSIAN_STRINGS,
        Locale::Uz => UZBEK_STRINGS,
    }
}
