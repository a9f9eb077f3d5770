//! Language switcher: typed locale substitution in URL paths and the sidebar widget.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::i18n::{Locale, Translations, UiKey};

/// A request path split into its locale prefix and the remainder.
///
/// `rest` is either empty or starts with `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalizedPath<'a> {
    pub locale: Option<Locale>,
    pub rest: &'a str,
}

impl<'a> LocalizedPath<'a> {
    pub fn parse(path: &'a str) -> Self {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let (first, remainder) = match trimmed.find('/') {
            Some(idx) => (&trimmed[..idx], &trimmed[idx..]),
            None => (trimmed, ""),
        };

        match Locale::from_code(first) {
            Ok(locale) => Self {
                locale: Some(locale),
                rest: remainder,
            },
            Err(_) => Self {
                locale: None,
                rest: if trimmed.is_empty() { "" } else { path },
            },
        }
    }

    /// Rebuild the path under another locale.
    pub fn with_locale(&self, locale: Locale) -> String {
        if self.rest.starts_with('/') || self.rest.is_empty() {
            format!("/{}{}", locale.code(), self.rest)
        } else {
            format!("/{}/{}", locale.code(), self.rest)
        }
    }
}

/// Path of the same page in `target`.
///
/// Paths without a locale prefix get the target prefix added.
pub fn switch_locale(path: &str, target: Locale) -> String {
    LocalizedPath::parse(path).with_locale(target)
}

/// Navigates to the selected option's URL; disabled while the navigation is pending.
pub const SWITCHER_SCRIPT: &str = r#"document.querySelectorAll('[data-language-switcher]').forEach(function (select) {
  select.addEventListener('change', function (event) {
    select.disabled = true;
    window.location.assign(event.target.value);
  });
});"#;

/// Sidebar footer widget for the page at `current_path`.
pub fn render_switcher(current_path: &str, current: Locale, translations: &Translations) -> String {
    let parsed = LocalizedPath::parse(current_path);
    let label = translations.get(current, UiKey::ChooseLanguage);

    let mut html = String::from("<div class=\"language-switcher\">");
    html.push_str(&format!(
        "<select data-language-switcher aria-label=\"{}\" title=\"{}\">",
        encode_double_quoted_attribute(label),
        encode_double_quoted_attribute(label),
    ));

    for locale in Locale::ALL {
        let selected = if locale == current { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\" lang=\"{}\"{}>{}</option>",
            encode_double_quoted_attribute(&parsed.with_locale(locale)),
            locale.code(),
            selected,
            encode_text(locale.native_name()),
        ));
    }

    html.push_str("</select></div>");
    html
}
