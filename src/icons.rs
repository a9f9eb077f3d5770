//! Icon lookup for page tree entries.
//!
//! Content files name icons by string (`icon: Rocket` in frontmatter). A name
//! the registry does not know simply renders without an icon.

use std::collections::HashMap;

use html_escape::encode_double_quoted_attribute;

/// A renderable icon handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Icon {
    pub name: &'static str,
    body: &'static str,
}

impl Icon {
    /// Inline SVG markup in the lucide 24x24 stroke style.
    pub fn to_svg(&self) -> String {
        format!(
            "<svg class=\"icon\" data-icon=\"{}\" xmlns=\"http://www.w3.org/2000/svg\" width=\"16\" height=\"16\" \
             viewBox=\"0 0 24 24\" fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\" \
             stroke-linecap=\"round\" stroke-linejoin=\"round\" aria-hidden=\"true\">{}</svg>",
            encode_double_quoted_attribute(self.name),
            self.body
        )
    }
}

/// Capability to turn an icon name into an icon.
pub trait IconResolver: Send + Sync {
    /// `None` means "no icon", never an error.
    fn resolve(&self, name: &str) -> Option<Icon>;
}

/// Built-in icon set.
#[derive(Debug, Clone)]
pub struct IconRegistry {
    icons: HashMap<&'static str, &'static str>,
}

impl IconRegistry {
    pub fn builtin() -> Self {
        Self {
            icons: BUILTIN_ICONS.iter().copied().collect(),
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.icons.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for IconRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl IconResolver for IconRegistry {
    fn resolve(&self, name: &str) -> Option<Icon> {
        self.icons
            .get_key_value(name)
            .map(|(name, body)| Icon { name: *name, body: *body })
    }
}

const BUILTIN_ICONS: &[(&str, &str)] = &[
    (
        "Book",
        r#"<path d="M4 19.5v-15A2.5 2.5 0 0 1 6.5 2H20v20H6.5a2.5 2.5 0 0 1 0-5H20"/>"#,
    ),
    (
        "BookOpen",
        r#"<path d="M2 3h6a4 4 0 0 1 4 4v14a3 3 0 0 0-3-3H2z"/><path d="M22 3h-6a4 4 0 0 0-4 4v14a3 3 0 0 1 3-3h7z"/>"#,
    ),
    (
        "Code",
        r#"<polyline points="16 18 22 12 16 6"/><polyline points="8 6 2 12 8 18"/>"#,
    ),
    (
        "FileText",
        r#"<path d="M15 2H6a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h12a2 2 0 0 0 2-2V7Z"/><path d="M14 2v4a2 2 0 0 0 2 2h4"/><path d="M16 13H8"/><path d="M16 17H8"/>"#,
    ),
    (
        "Globe",
        r#"<circle cx="12" cy="12" r="10"/><path d="M12 2a14.5 14.5 0 0 0 0 20 14.5 14.5 0 0 0 0-20"/><path d="M2 12h20"/>"#,
    ),
    (
        "House",
        r#"<path d="M3 10a2 2 0 0 1 .709-1.528l7-5.999a2 2 0 0 1 2.582 0l7 5.999A2 2 0 0 1 21 10v9a2 2 0 0 1-2 2H5a2 2 0 0 1-2-2z"/>"#,
    ),
    (
        "Info",
        r#"<circle cx="12" cy="12" r="10"/><path d="M12 16v-4"/><path d="M12 8h.01"/>"#,
    ),
    (
        "Key",
        r#"<circle cx="7.5" cy="15.5" r="5.5"/><path d="m21 2-9.6 9.6"/><path d="m15.5 7.5 3 3L22 7l-3-3"/>"#,
    ),
    (
        "Mic",
        r#"<path d="M12 2a3 3 0 0 0-3 3v7a3 3 0 0 0 6 0V5a3 3 0 0 0-3-3Z"/><path d="M19 10v2a7 7 0 0 1-14 0v-2"/><line x1="12" x2="12" y1="19" y2="22"/>"#,
    ),
    (
        "Rocket",
        r#"<path d="M4.5 16.5c-1.5 1.26-2 5-2 5s3.74-.5 5-2c.71-.84.7-2.13-.09-2.91a2.18 2.18 0 0 0-2.91-.09z"/><path d="m12 15-3-3a22 22 0 0 1 2-3.95A12.88 12.88 0 0 1 22 2c0 2.72-.78 7.5-6 11a22.35 22.35 0 0 1-4 2z"/>"#,
    ),
    (
        "Server",
        r#"<rect width="20" height="8" x="2" y="2" rx="2" ry="2"/><rect width="20" height="8" x="2" y="14" rx="2" ry="2"/>"#,
    ),
    (
        "Settings",
        r#"<circle cx="12" cy="12" r="3"/><path d="M12 2v2"/><path d="M12 20v2"/><path d="m4.93 4.93 1.41 1.41"/><path d="m17.66 17.66 1.41 1.41"/><path d="M2 12h2"/><path d="M20 12h2"/>"#,
    ),
    (
        "Terminal",
        r#"<polyline points="4 17 10 11 4 5"/><line x1="12" x2="20" y1="19" y2="19"/>"#,
    ),
    (
        "Zap",
        r#"<path d="M4 14a1 1 0 0 1-.78-1.63l9.9-10.2a.5.5 0 0 1 .86.46l-1.92 6.02A1 1 0 0 0 13 10h7a1 1 0 0 1 .78 1.63l-9.9 10.2a.5.5 0 0 1-.86-.46l1.92-6.02A1 1 0 0 0 11 14z"/>"#,
    ),
];
