// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Depth-first crawling starting from a seed address
// - Assets of a page are crawled before the page is reported done
// - Allow/deny patterns plus pluggable filter hooks
// - Optional depth limit, parallel branches, per-download timeout, cancellation
//
// Rust concepts:
// - Async programming: For concurrent network requests
// - Recursion through boxed futures
// =============================================================================

mod config;
mod report;
mod spider;

pub use config::SpiderConfig;
pub use report::{CrawlReport, ResourceSummary};
pub use spider::Spider;
