// src/resource/mod.rs
// =============================================================================
// This module represents a fetched body and the links it declares.
//
// Submodules:
// - kind:     content kinds (Default, Html, Markdown, Css) and their registry
// - mime:     content type -> extension lookup
// - html:     link extraction from HTML
// - markdown: link extraction from Markdown
// - css:      asset extraction from stylesheets
//
// A Resource is built once per successful download and never changes after
// that, except that discovered links are computed on first access and cached.
//
// Link extraction works in two steps:
// 1. raw link strings are de-duplicated by exact text (first one wins)
// 2. every surviving string is resolved against this resource's address
// Two spellings of the same target both survive step 1; the visited registry
// catches the second one before it is fetched again.
// =============================================================================

mod css;
mod html;
mod kind;
mod markdown;
mod mime;

pub use kind::{essence, is_textual, ContentKind, ContentKindRegistry, RawLinks};
pub use mime::{MimeRegistry, StaticMimeRegistry};

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use crate::address::Address;

#[derive(Debug, Default)]
struct Links {
    pages: Vec<Address>,
    assets: Vec<Address>,
}

/// The fetched representation of one address.
#[derive(Debug)]
pub struct Resource {
    address: Address,
    body: Option<Vec<u8>>,
    content_type: String,
    extension: Option<String>,
    kind: ContentKind,
    binary: bool,
    links: OnceLock<Links>,
}

impl Resource {
    /// Builds a resource using the built-in kind and extension tables.
    pub fn new(address: Address, body: Option<Vec<u8>>, content_type: impl Into<String>) -> Self {
        ResourceFactory::default().create(address, body, content_type, None)
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Body as text. `None` for binary resources and missing bodies.
    pub fn content(&self) -> Option<&str> {
        if self.binary {
            return None;
        }
        self.body
            .as_deref()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Text body that is worth scanning for links.
    pub fn has_extractable_content(&self) -> bool {
        self.content().is_some_and(|text| !text.is_empty())
    }

    /// Next pages to crawl, in document order.
    pub fn page_addresses(&self) -> &[Address] {
        &self.links().pages
    }

    /// Sub-resources owned by this resource, in document order.
    pub fn asset_addresses(&self) -> &[Address] {
        &self.links().assets
    }

    fn links(&self) -> &Links {
        self.links.get_or_init(|| {
            if !self.kind.extracts_links() {
                return Links::default();
            }
            let Some(content) = self.content() else {
                return Links::default();
            };
            let raw = self.kind.extract(content);
            Links {
                pages: self.resolve_raw_links(raw.pages),
                assets: self.resolve_raw_links(raw.assets),
            }
        })
    }

    fn resolve_raw_links(&self, raw_links: Vec<String>) -> Vec<Address> {
        let mut seen = HashSet::new();
        raw_links
            .into_iter()
            .filter(|raw| !raw.trim().is_empty() && !is_inline_data(raw))
            .filter(|raw| seen.insert(raw.clone()))
            .filter_map(|raw| match Address::resolve(&raw, &self.address) {
                Ok(address) => Some(address),
                Err(e) => {
                    tracing::debug!(page = %self.address, link = %raw, error = %e, "skipping unresolvable link");
                    None
                }
            })
            .collect()
    }
}

// data: URIs carry their payload inline; there is nothing to download
fn is_inline_data(raw: &str) -> bool {
    raw.trim_start()
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:"))
}

/// Builds resources from downloaded bodies.
///
/// Holds the content-kind registry (which variant handles which content type)
/// and the extension lookup used when the fetcher has no extension hint.
#[derive(Clone)]
pub struct ResourceFactory {
    kinds: ContentKindRegistry,
    mime: Arc<dyn MimeRegistry>,
}

impl Default for ResourceFactory {
    fn default() -> Self {
        Self {
            kinds: ContentKindRegistry::default(),
            mime: Arc::new(StaticMimeRegistry),
        }
    }
}

impl ResourceFactory {
    pub fn new(kinds: ContentKindRegistry, mime: Arc<dyn MimeRegistry>) -> Self {
        Self { kinds, mime }
    }

    pub fn kinds_mut(&mut self) -> &mut ContentKindRegistry {
        &mut self.kinds
    }

    pub fn create(
        &self,
        address: Address,
        body: Option<Vec<u8>>,
        content_type: impl Into<String>,
        extension_hint: Option<String>,
    ) -> Resource {
        let content_type = content_type.into();
        let kind = self.kinds.lookup(&content_type);
        let extension = extension_hint.or_else(|| self.mime.resolve_extension(&content_type));
        let binary = !is_textual(&content_type)
            || body
                .as_deref()
                .is_some_and(|bytes| std::str::from_utf8(bytes).is_err());

        Resource {
            address,
            body: body.filter(|bytes| !bytes.is_empty()),
            content_type,
            extension,
            kind,
            binary,
            links: OnceLock::new(),
        }
    }
}

impl std::fmt::Debug for ResourceFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceFactory")
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, content_type: &str, body: &str) -> Resource {
        Resource::new(
            Address::parse(url).unwrap(),
            Some(body.as_bytes().to_vec()),
            content_type,
        )
    }

    #[test]
    fn test_constructor() {
        let resource = page("http://www.domain.com/", "text/html", "Page Content");
        assert_eq!(resource.address().as_str(), "http://www.domain.com/");
        assert_eq!(resource.content(), Some("Page Content"));
        assert_eq!(resource.content_type(), "text/html");
        assert_eq!(resource.extension(), Some("html"));
        assert_eq!(resource.kind(), ContentKind::Html);
        assert!(!resource.is_binary());
    }

    #[test]
    fn test_html_links_are_resolved() {
        let resource = page(
            "https://example.com/docs/index.html",
            "text/html",
            r#"<a href="intro.html">Intro</a><a href="/about">About</a><img src="img/a.png">"#,
        );
        let pages: Vec<_> = resource.page_addresses().iter().map(Address::as_str).collect();
        let assets: Vec<_> = resource.asset_addresses().iter().map(Address::as_str).collect();
        assert_eq!(pages, vec!["https://example.com/docs/intro.html", "https://example.com/about"]);
        assert_eq!(assets, vec!["https://example.com/docs/img/a.png"]);
        assert_eq!(resource.page_addresses()[0].referrer(), Some(resource.address().url()));
    }

    #[test]
    fn test_dedup_raw_text_only() {
        let resource = page(
            "https://example.com/",
            "text/html",
            r#"<a href="a.html">1</a><a href="a.html">2</a><a href="/a.html">3</a><a href="">4</a>"#,
        );
        let raws: Vec<_> = resource.page_addresses().iter().map(Address::raw).collect();
        assert_eq!(raws, vec!["a.html", "/a.html"]);
        assert_eq!(resource.page_addresses()[0], resource.page_addresses()[1]);
    }

    #[test]
    fn test_default_kind_extracts_nothing() {
        let resource = page("https://example.com/notes.txt", "text/plain", "<a href=\"x.html\">x</a>");
        assert_eq!(resource.kind(), ContentKind::Default);
        assert!(resource.has_extractable_content());
        assert!(resource.page_addresses().is_empty());
        assert!(resource.asset_addresses().is_empty());
    }

    #[test]
    fn test_binary_never_yields_links() {
        let resource = page(
            "http://example.com/",
            "application/pdf",
            "<a href=\"http://example.com/x\">x</a>",
        );
        assert!(resource.is_binary());
        assert_eq!(resource.content(), None);
        assert!(!resource.has_extractable_content());
        assert!(resource.page_addresses().is_empty());
        assert!(resource.asset_addresses().is_empty());
        assert_eq!(resource.extension(), Some("pdf"));
    }

    #[test]
    fn test_invalid_utf8_is_binary() {
        let resource = Resource::new(
            Address::parse("http://example.com/").unwrap(),
            Some(vec![0xff, 0xfe, b'<', b'a']),
            "text/html",
        );
        assert!(resource.is_binary());
        assert!(resource.page_addresses().is_empty());
    }

    #[test]
    fn test_empty_body_has_no_content() {
        let resource = page("http://example.com/", "text/html", "");
        assert!(resource.body().is_none());
        assert!(!resource.has_extractable_content());
    }

    #[test]
    fn test_skips_data_uris() {
        let resource = page(
            "https://example.com/",
            "text/html",
            r#"<img src="data:image/png;base64,AAAA"><img src="b.png">"#,
        );
        let raws: Vec<_> = resource.asset_addresses().iter().map(Address::raw).collect();
        assert_eq!(raws, vec!["b.png"]);
    }

    #[test]
    fn test_factory_prefers_extension_hint() {
        let factory = ResourceFactory::default();
        let resource = factory.create(
            Address::parse("https://example.com/feed").unwrap(),
            Some(b"{}".to_vec()),
            "application/json",
            Some("rss".to_string()),
        );
        assert_eq!(resource.extension(), Some("rss"));
    }

    #[test]
    fn test_factory_custom_kind() {
        let mut factory = ResourceFactory::default();
        factory.kinds_mut().register("text/plain", ContentKind::Markdown);
        let resource = factory.create(
            Address::parse("https://example.com/readme").unwrap(),
            Some(b"[next](next.txt)".to_vec()),
            "text/plain",
            None,
        );
        let pages: Vec<_> = resource.page_addresses().iter().map(Address::as_str).collect();
        assert_eq!(pages, vec!["https://example.com/readme/next.txt"]);
    }
}
