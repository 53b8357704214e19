// src/error.rs
// =============================================================================
// Typed errors for the spider library.
//
// The library uses `thiserror` so callers can match on what went wrong;
// the binary wraps everything in `anyhow` like link-guardian does.
//
// Three families:
// - AddressError: a raw link could not be turned into an absolute address
// - FetchError:   a single download failed (never fatal to the crawl)
// - SpiderError:  setup problems (bad seed, bad allow/deny pattern)
// =============================================================================

use thiserror::Error;

/// A raw link that cannot be resolved into a valid absolute address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("invalid address '{raw}': {reason}")]
    Invalid { raw: String, reason: String },
}

/// Why a single fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("download failed for {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("download timed out: {url}")]
    Timeout { url: String },

    #[error("download failed for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("download cancelled: {url}")]
    Cancelled { url: String },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. }
            | FetchError::Timeout { url }
            | FetchError::Transport { url, .. }
            | FetchError::Cancelled { url } => url,
        }
    }
}

/// Errors surfaced by the spider's public API.
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("invalid url pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type SpiderResult<T> = Result<T, SpiderError>;
