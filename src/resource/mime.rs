// src/resource/mime.rs
// =============================================================================
// Content-Type -> file extension lookup.
//
// Used when a fetched resource carries no extension hint of its own (for
// example "https://example.com/" served as text/html becomes "html").
//
// The lookup itself is `mime_guess`. Its extension lists are alphabetical,
// so a few common types get the extension people actually expect
// ("html" rather than "htm", "jpg" rather than "jfif").
// =============================================================================

use super::kind::essence;

pub trait MimeRegistry: Send + Sync {
    /// Preferred extension for a content type, without the leading dot.
    fn resolve_extension(&self, content_type: &str) -> Option<String>;
}

/// Registry backed by the `mime_guess` database.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticMimeRegistry;

const PREFERRED: &[(&str, &str)] = &[
    ("text/html", "html"),
    ("text/plain", "txt"),
    ("text/markdown", "md"),
    ("text/x-markdown", "md"),
    ("text/javascript", "js"),
    ("application/javascript", "js"),
    ("application/xml", "xml"),
    ("text/xml", "xml"),
    ("image/jpeg", "jpg"),
    ("image/svg+xml", "svg"),
    ("image/x-icon", "ico"),
    ("image/vnd.microsoft.icon", "ico"),
    ("audio/mpeg", "mp3"),
    ("audio/ogg", "ogg"),
    ("video/mp4", "mp4"),
];

impl MimeRegistry for StaticMimeRegistry {
    fn resolve_extension(&self, content_type: &str) -> Option<String> {
        let essence = essence(content_type);
        if let Some((_, extension)) = PREFERRED.iter().find(|(mime, _)| *mime == essence) {
            return Some(extension.to_string());
        }
        mime_guess::get_mime_extensions_str(&essence)
            .and_then(|extensions| extensions.first())
            .map(|extension| extension.to_string())
    }
}
