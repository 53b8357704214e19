// src/fetcher/mod.rs
// =============================================================================
// This module contains the download side of the spider.
//
// Submodules:
// - http:   the real network fetcher, built on reqwest
// - memory: an in-memory fetcher serving canned bodies (tests, demos)
//
// The spider only knows the `Fetcher` trait, so any transport can be plugged
// in. A fetcher turns an Address into a Resource, or fails with a FetchError
// on network errors and non-success statuses.
// =============================================================================

mod http;
mod memory;

pub use http::{HttpFetcher, HttpOptions};
pub use memory::MemoryFetcher;

use async_trait::async_trait;

use crate::address::Address;
use crate::error::FetchError;
use crate::resource::Resource;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads `address`.
    ///
    /// On success the returned resource's address carries a [`ResponseMeta`]
    /// under [`crate::address::RESPONSE_PARAMETER`] for observers.
    async fn fetch(&self, address: &Address) -> Result<Resource, FetchError>;
}

/// What the transport reported for a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    /// URL after redirects.
    pub final_url: String,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}
