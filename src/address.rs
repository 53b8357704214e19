// src/address.rs
// =============================================================================
// This module models a crawlable address.
//
// An Address keeps three things together:
// - the raw link text exactly as it appeared in the page (patterns match this)
// - the resolved absolute URL (what we actually fetch)
// - an open bag of side-channel parameters (who discovered it, the response)
//
// Resolution rules (applied to the raw text, against the page's address):
//   "http://a/b", "mailto:x"  -> already absolute
//   "//cdn.host/x.js"         -> inherits the page's scheme
//   "/docs"                   -> page origin + "/docs"
//   "img/a.png"               -> appended to the page path, or to its parent
//                                directory when the page path names a file
//
// Canonical form: scheme and host are lower-cased by the `url` crate, path
// case is preserved, dot segments are collapsed and the fragment is dropped.
// Two addresses are equal when their canonical forms are equal.
// =============================================================================

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use url::Url;

use crate::error::AddressError;

/// Parameter holding the URL of the resource that declared this address.
pub const PAGE_PARAMETER: &str = "page";

/// Parameter holding the fetcher's `ResponseMeta` once the address is downloaded.
pub const RESPONSE_PARAMETER: &str = "response";

/// Open side-channel mapping attached to an address.
///
/// Values can be of any `Send + Sync` type and are read back with a typed
/// lookup. Cloning an address shares the stored values.
#[derive(Clone, Default)]
pub struct Parameters {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Parameters {
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|value| value.downcast_ref::<T>())
    }

    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(key.into(), Arc::new(value));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        f.debug_set().entries(keys).finish()
    }
}

/// One crawlable location.
#[derive(Clone)]
pub struct Address {
    raw: String,
    url: Url,
    key: String,
    parameters: Parameters,
}

impl Address {
    /// Parses a fully formed address, such as a crawl seed.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }
        let url = Url::parse(trimmed).map_err(|e| AddressError::Invalid {
            raw: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_parts(raw, url))
    }

    /// Resolves a raw link found in the resource at `base`.
    ///
    /// Relative links are always resolved against `base`'s resolved URL, never
    /// its raw text. The base URL is recorded under [`PAGE_PARAMETER`].
    pub fn resolve(raw: &str, base: &Address) -> Result<Self, AddressError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let absolute = if has_scheme(trimmed) {
            trimmed.to_string()
        } else if trimmed.starts_with("//") {
            format!("{}:{}", base.scheme(), trimmed)
        } else if trimmed.starts_with('/') {
            format!("{}{}", base.origin(), trimmed)
        } else {
            let base_path = base.path();
            let directory = if has_extension(base_path) {
                parent_directory(base_path)
            } else {
                base_path.trim_end_matches('/')
            };
            format!("{}{}/{}", base.origin(), directory, trimmed)
        };

        let url = Url::parse(&absolute).map_err(|e| AddressError::Invalid {
            raw: raw.to_string(),
            reason: e.to_string(),
        })?;

        let mut address = Self::from_parts(raw, url);
        address.set_parameter(PAGE_PARAMETER, base.url.clone());
        Ok(address)
    }

    fn from_parts(raw: &str, url: Url) -> Self {
        let mut canonical = url.clone();
        canonical.set_fragment(None);
        Self {
            raw: raw.to_string(),
            key: canonical.to_string(),
            url,
            parameters: Parameters::default(),
        }
    }

    /// The link text exactly as it was supplied.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Dedup key: scheme, host, port, path and query in canonical form.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Scheme plus host (and non-default port), e.g. `https://example.com`.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    /// File extension of the last path segment, if it names a file.
    pub fn extension(&self) -> Option<&str> {
        path_extension(self.path())
    }

    /// URL of the resource that declared this address, if any.
    pub fn referrer(&self) -> Option<&Url> {
        self.parameter::<Url>(PAGE_PARAMETER)
    }

    pub fn parameter<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.parameters.get(key)
    }

    pub fn set_parameter<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.parameters.set(key, value);
    }

    pub fn with_parameter<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.set_parameter(key, value);
        self
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Address")
            .field("raw", &self.raw)
            .field("url", &self.url.as_str())
            .field("parameters", &self.parameters)
            .finish()
    }
}

// "http:", "mailto:", "javascript:" ... (RFC 3986 scheme syntax)
fn has_scheme(raw: &str) -> bool {
    let Some(colon) = raw.find(':') else {
        return false;
    };
    let scheme = &raw[..colon];
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn path_extension(path: &str) -> Option<&str> {
    if path.ends_with('/') {
        return None;
    }
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rfind('.') {
        Some(dot) if dot + 1 < segment.len() => Some(&segment[dot + 1..]),
        _ => None,
    }
}

fn has_extension(path: &str) -> bool {
    path_extension(path).is_some()
}

// "/a/b.html" -> "/a", "/b.html" -> ""
fn parent_directory(path: &str) -> &str {
    match path.rfind('/') {
        Some(slash) => &path[..slash],
        None => "",
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why keep the raw text?
//    - Allow/deny patterns are written against links as they appear in markup
//    - It also makes log lines easier to trace back to the page source
//
// 2. Why Arc<dyn Any> for parameters?
//    - Observers stash values of their own types on an address
//    - downcast_ref gives typed access back without a central enum
// -----------------------------------------------------------------------------
