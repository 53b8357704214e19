// src/resource/kind.rs
// =============================================================================
// Content kinds and the registry that maps a Content-Type to one.
//
// Each kind declares the content types it understands. Anything the registry
// does not know about falls back to `ContentKind::Default`, which never
// extracts links. An unsupported content type is not an error.
// =============================================================================

use std::collections::HashMap;

use serde::Serialize;

use super::{css, html, markdown};

/// Raw link text found in a body, split by role.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawLinks {
    /// Links to further pages (navigation).
    pub pages: Vec<String>,
    /// Links to sub-resources of this page (images, scripts, styles).
    pub assets: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Anything: no link extraction.
    Default,
    Html,
    Markdown,
    Css,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Default,
        ContentKind::Html,
        ContentKind::Markdown,
        ContentKind::Css,
    ];

    /// Content types this kind handles. `*` means "any".
    pub fn supported_types(self) -> &'static [&'static str] {
        match self {
            ContentKind::Default => &["*"],
            ContentKind::Html => &["text/html", "application/xhtml+xml"],
            ContentKind::Markdown => &["text/markdown", "text/x-markdown"],
            ContentKind::Css => &["text/css"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ContentKind::Default => "default",
            ContentKind::Html => "html",
            ContentKind::Markdown => "markdown",
            ContentKind::Css => "css",
        }
    }

    pub fn extracts_links(self) -> bool {
        !matches!(self, ContentKind::Default)
    }

    pub(crate) fn extract(self, content: &str) -> RawLinks {
        match self {
            ContentKind::Default => RawLinks::default(),
            ContentKind::Html => html::extract_html_links(content),
            ContentKind::Markdown => markdown::extract_markdown_links(content),
            ContentKind::Css => css::extract_css_links(content),
        }
    }
}

/// Maps content types to content kinds.
#[derive(Debug, Clone)]
pub struct ContentKindRegistry {
    kinds: HashMap<String, ContentKind>,
}

impl Default for ContentKindRegistry {
    fn default() -> Self {
        let mut registry = Self {
            kinds: HashMap::new(),
        };
        for kind in ContentKind::ALL {
            for content_type in kind.supported_types() {
                if *content_type != "*" {
                    registry.register(content_type, kind);
                }
            }
        }
        registry
    }
}

impl ContentKindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `content_type` to `kind`, replacing any earlier mapping.
    pub fn register(&mut self, content_type: &str, kind: ContentKind) {
        self.kinds.insert(essence(content_type), kind);
    }

    pub fn lookup(&self, content_type: &str) -> ContentKind {
        self.kinds
            .get(&essence(content_type))
            .copied()
            .unwrap_or(ContentKind::Default)
    }
}

/// `"Text/HTML; charset=utf-8"` -> `"text/html"`
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a body of this content type should be read as text.
pub fn is_textual(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence.starts_with("text/")
        || essence.ends_with("+xml")
        || essence.ends_with("+json")
        || matches!(
            essence.as_str(),
            "application/json"
                | "application/xml"
                | "application/javascript"
                | "application/ecmascript"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_builtin_kinds() {
        let registry = ContentKindRegistry::new();
        assert_eq!(registry.lookup("text/html; charset=UTF-8"), ContentKind::Html);
        assert_eq!(registry.lookup("Application/XHTML+XML"), ContentKind::Html);
        assert_eq!(registry.lookup("text/markdown"), ContentKind::Markdown);
        assert_eq!(registry.lookup("text/css"), ContentKind::Css);
    }

    #[test]
    fn test_unknown_falls_back_to_default() {
        let registry = ContentKindRegistry::new();
        assert_eq!(registry.lookup("application/pdf"), ContentKind::Default);
        assert_eq!(registry.lookup(""), ContentKind::Default);
        assert!(!ContentKind::Default.extracts_links());
    }

    #[test]
    fn test_register_custom_type() {
        let mut registry = ContentKindRegistry::new();
        registry.register("text/plain", ContentKind::Markdown);
        assert_eq!(registry.lookup("text/plain"), ContentKind::Markdown);
    }

    #[test]
    fn test_is_textual() {
        assert!(is_textual("text/plain"));
        assert!(is_textual("image/svg+xml"));
        assert!(is_textual("application/javascript"));
        assert!(!is_textual("image/png"));
        assert!(!is_textual("application/pdf"));
    }
}
