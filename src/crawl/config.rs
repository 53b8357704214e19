// src/crawl/config.rs
// =============================================================================
// Crawl settings.
//
// The defaults reproduce the plain behaviour: one download at a time, no
// depth limit, no timeout beyond the fetcher's own, no patterns.
// =============================================================================

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SpiderConfig {
    /// Raw links matching any of these are always crawled.
    pub allow_patterns: Vec<String>,
    /// Raw links matching any of these are skipped (unless allowed).
    pub deny_patterns: Vec<String>,
    /// Maximum number of page hops from the seed.
    ///
    /// 1 = just the seed page (and its assets), 2 = the seed plus the pages
    /// it links to, and so on. 0 crawls nothing, not even the seed. `None`
    /// means no limit.
    pub max_depth: Option<usize>,
    /// Downloads allowed in flight at once. 1 keeps the crawl sequential.
    pub concurrency: usize,
    /// Upper bound for a single download.
    pub fetch_timeout: Option<Duration>,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            allow_patterns: Vec::new(),
            deny_patterns: Vec::new(),
            max_depth: None,
            concurrency: 1,
            fetch_timeout: None,
        }
    }
}

impl SpiderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, pattern: impl Into<String>) -> Self {
        self.allow_patterns.push(pattern.into());
        self
    }

    pub fn deny(mut self, pattern: impl Into<String>) -> Self {
        self.deny_patterns.push(pattern.into());
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn is_sequential(&self) -> bool {
        self.concurrency <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sequential_and_unbounded() {
        let config = SpiderConfig::default();
        assert!(config.is_sequential());
        assert_eq!(config.max_depth, None);
        assert_eq!(config.fetch_timeout, None);
    }

    #[test]
    fn test_builder() {
        let config = SpiderConfig::new()
            .allow(r"\.css$")
            .deny("^/admin")
            .max_depth(2)
            .concurrency(0)
            .fetch_timeout(Duration::from_secs(3));
        assert_eq!(config.allow_patterns, vec![r"\.css$"]);
        assert_eq!(config.deny_patterns, vec!["^/admin"]);
        assert_eq!(config.max_depth, Some(2));
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(3)));
    }
}
