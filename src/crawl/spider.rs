// src/crawl/spider.rs
// =============================================================================
// This module implements the depth-first crawl.
//
// How one address is processed:
// 1. Run the filter; a rejected address is simply dropped
// 2. Claim it in the visited registry and announce "collect-address"
// 3. Download it; a failure raises "download-error" and ends this branch
// 4. Record the resource
// 5. If it has text content:
//    - announce "collect-asset-addresses"
//    - crawl every asset link to completion, one after another
//    - announce "collected-asset-addresses"
// 6. Announce "collected-address"
// 7. If it has text content, crawl its page links
//
// So a page's assets (and everything they pull in) are always settled before
// the page is reported done, and before any of its page links are visited.
//
// The traversal keeps its pending work on explicit stacks instead of
// recursing, so a chain of thousands of pages costs heap, not native stack:
// - a branch is one page plus its assets; inside a branch the steps above
//   are `Frame`s on a Vec
// - the page links of step 7 become new branches on a shared pending stack
//
// With concurrency > 1 several branches run side by side. Each branch is
// still sequential, so the order above holds inside every branch.
//
// Rust concepts:
// - FuturesUnordered: polls the running branches and yields whichever
//   finishes first
// - Arc: resources are shared between the report and the observers
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use regex::Regex;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::SpiderConfig;
use super::report::CrawlReport;
use crate::address::Address;
use crate::error::{FetchError, SpiderResult};
use crate::events::{Dispatcher, Observer, SpiderEvent};
use crate::fetcher::Fetcher;
use crate::filter::{compile_patterns, FilterPipeline, Verdict};
use crate::resource::Resource;
use crate::visited::VisitedRegistry;

/// One crawl session.
pub struct Spider {
    fetcher: Arc<dyn Fetcher>,
    filters: FilterPipeline,
    dispatcher: Dispatcher,
    visited: Arc<VisitedRegistry>,
    resources: Mutex<Vec<Arc<Resource>>>,
    download_errors: AtomicUsize,
    max_depth: Option<usize>,
    concurrency: usize,
    fetch_timeout: Option<Duration>,
    permits: Semaphore,
    cancel: CancellationToken,
}

/// Pending work inside one branch, kept on an explicit stack.
enum Frame {
    Visit {
        address: Address,
        depth: usize,
        root: bool,
    },
    AssetsSettled {
        resource: Arc<Resource>,
    },
    Finish {
        resource: Arc<Resource>,
        depth: usize,
        root: bool,
    },
}

impl Spider {
    /// A sequential spider with no patterns and no depth limit.
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        let concurrency = 1;
        Self {
            fetcher,
            filters: FilterPipeline::new(),
            dispatcher: Dispatcher::new(),
            visited: Arc::new(VisitedRegistry::new()),
            resources: Mutex::new(Vec::new()),
            download_errors: AtomicUsize::new(0),
            max_depth: None,
            concurrency,
            fetch_timeout: None,
            permits: Semaphore::new(concurrency),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(fetcher: Arc<dyn Fetcher>, config: SpiderConfig) -> SpiderResult<Self> {
        let concurrency = config.concurrency.max(1);
        let mut spider = Self::new(fetcher);
        spider.set_allow_patterns(&config.allow_patterns)?;
        spider.set_deny_patterns(&config.deny_patterns)?;
        spider.max_depth = config.max_depth;
        spider.concurrency = concurrency;
        spider.permits = Semaphore::new(concurrency);
        spider.fetch_timeout = config.fetch_timeout;
        Ok(spider)
    }

    /// Shares a visited registry with another session.
    pub fn with_visited(mut self, visited: Arc<VisitedRegistry>) -> Self {
        self.visited = visited;
        self
    }

    pub fn set_allow_patterns<S: AsRef<str>>(&mut self, patterns: &[S]) -> SpiderResult<()> {
        self.filters.set_allow_patterns(compile_patterns(patterns)?);
        Ok(())
    }

    pub fn append_allow_patterns<S: AsRef<str>>(&mut self, patterns: &[S]) -> SpiderResult<()> {
        self.filters.append_allow_patterns(compile_patterns(patterns)?);
        Ok(())
    }

    pub fn allow_patterns(&self) -> &[Regex] {
        self.filters.allow_patterns()
    }

    pub fn set_deny_patterns<S: AsRef<str>>(&mut self, patterns: &[S]) -> SpiderResult<()> {
        self.filters.set_deny_patterns(compile_patterns(patterns)?);
        Ok(())
    }

    pub fn append_deny_patterns<S: AsRef<str>>(&mut self, patterns: &[S]) -> SpiderResult<()> {
        self.filters.append_deny_patterns(compile_patterns(patterns)?);
        Ok(())
    }

    pub fn deny_patterns(&self) -> &[Regex] {
        self.filters.deny_patterns()
    }

    /// Registers a filter hook; returning `true` skips the address.
    pub fn add_filter_hook<F>(&mut self, hook: F)
    where
        F: Fn(&Address) -> bool + Send + Sync + 'static,
    {
        self.filters.add_hook(Arc::new(hook));
    }

    /// Skips every address outside `origin` (e.g. `https://example.com`).
    pub fn restrict_to_origin(&mut self, origin: impl Into<String>) {
        let origin = origin.into();
        self.add_filter_hook(move |address| address.origin() != origin);
    }

    pub fn subscribe<O: Observer + 'static>(&mut self, observer: O) {
        self.dispatcher.subscribe(Arc::new(observer));
    }

    /// Subscribes a closure to every signal.
    pub fn on_event<F>(&mut self, callback: F)
    where
        F: Fn(&SpiderEvent<'_>, &Spider) + Send + Sync + 'static,
    {
        self.subscribe(callback);
    }

    pub fn subscribe_shared(&mut self, observer: Arc<dyn Observer>) {
        self.dispatcher.subscribe(observer);
    }

    pub fn visited(&self) -> &VisitedRegistry {
        &self.visited
    }

    pub fn resources(&self) -> Vec<Arc<Resource>> {
        self.resources
            .lock()
            .map(|resources| resources.clone())
            .unwrap_or_default()
    }

    pub fn download_errors(&self) -> usize {
        self.download_errors.load(Ordering::SeqCst)
    }

    /// Cancelling this token stops the crawl: nothing new is claimed and
    /// in-flight downloads are abandoned.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls everything reachable from `seed`.
    ///
    /// Only an unparseable seed is an error. Failed downloads are reported
    /// through "download-error" signals and counted in the report.
    pub async fn run(&self, seed: &str) -> SpiderResult<CrawlReport> {
        let seed = Address::parse(seed)?;
        info!(seed = %seed, concurrency = self.concurrency, max_depth = ?self.max_depth, "crawl started");

        self.process(seed).await;

        let report = CrawlReport {
            resources: self.resources(),
            download_errors: self.download_errors(),
            cancelled: self.cancel.is_cancelled(),
        };
        info!(
            resources = report.resources.len(),
            download_errors = report.download_errors,
            cancelled = report.cancelled,
            "crawl finished"
        );
        Ok(report)
    }

    /// Processes one address (and everything reachable from it) as a seed.
    pub async fn process(&self, address: Address) {
        self.process_at(address, 0).await
    }

    /// Whether `address` would be queued right now.
    ///
    /// Raises "filter-address" when the fixed rules leave the decision to
    /// the hooks.
    pub fn is_eligible(&self, address: &Address) -> bool {
        match self.filters.check_rules(address, &self.visited) {
            Verdict::Allowed => true,
            Verdict::Undecided => {
                self.emit(SpiderEvent::FilterAddress { address });
                let skipped = self.filters.is_skipped_by_hooks(address);
                if skipped {
                    debug!(url = %address, raw = address.raw(), "skipped by filter hook");
                }
                !skipped
            }
            verdict => {
                debug!(url = %address, raw = address.raw(), ?verdict, "rejected");
                false
            }
        }
    }

    /// Runs branches off a shared stack until every reachable address is
    /// settled, with at most `concurrency` branches in flight.
    async fn process_at(&self, seed: Address, depth: usize) {
        let mut pending = vec![(seed, depth)];
        let mut running = FuturesUnordered::new();

        loop {
            while running.len() < self.concurrency {
                match pending.pop() {
                    Some((address, depth)) => running.push(self.walk(address, depth)),
                    None => break,
                }
            }
            match running.next().await {
                // Reversed so the first link is the next one popped.
                Some(pages) => pending.extend(pages.into_iter().rev()),
                None => break,
            }
        }
    }

    /// Crawls one branch: the page at `address`, its assets and everything
    /// they pull in. Returns the page links of the branch's own page, which
    /// become new branches one hop deeper.
    async fn walk(&self, address: Address, depth: usize) -> Vec<(Address, usize)> {
        let mut stack = vec![Frame::Visit {
            address,
            depth,
            root: true,
        }];
        let mut branches = Vec::new();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit {
                    address,
                    depth,
                    root,
                } => {
                    let Some(resource) = self.collect(address, depth).await else {
                        continue;
                    };
                    if !resource.has_extractable_content() {
                        self.emit(SpiderEvent::CollectedAddress {
                            address: resource.address(),
                            resource: &resource,
                        });
                        continue;
                    }

                    self.emit(SpiderEvent::CollectAssetAddresses {
                        address: resource.address(),
                        resource: &resource,
                    });
                    stack.push(Frame::Finish {
                        resource: Arc::clone(&resource),
                        depth,
                        root,
                    });
                    stack.push(Frame::AssetsSettled {
                        resource: Arc::clone(&resource),
                    });
                    for asset in resource.asset_addresses().iter().rev() {
                        stack.push(Frame::Visit {
                            address: asset.clone(),
                            depth,
                            root: false,
                        });
                    }
                }
                Frame::AssetsSettled { resource } => {
                    self.emit(SpiderEvent::CollectedAssetAddresses {
                        address: resource.address(),
                        resource: &resource,
                    });
                }
                Frame::Finish {
                    resource,
                    depth,
                    root,
                } => {
                    self.emit(SpiderEvent::CollectedAddress {
                        address: resource.address(),
                        resource: &resource,
                    });
                    let pages = resource.page_addresses();
                    if root {
                        branches.extend(pages.iter().map(|page| (page.clone(), depth + 1)));
                    } else {
                        // Page links of an asset are part of the asset.
                        for page in pages.iter().rev() {
                            stack.push(Frame::Visit {
                                address: page.clone(),
                                depth: depth + 1,
                                root: false,
                            });
                        }
                    }
                }
            }
        }

        branches
    }

    /// Filters, claims and downloads one address. `None` when the address
    /// was dropped or its download failed.
    async fn collect(&self, address: Address, depth: usize) -> Option<Arc<Resource>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        if self.max_depth.is_some_and(|max| depth >= max) {
            debug!(url = %address, depth, "beyond max depth");
            return None;
        }
        if !self.is_eligible(&address) {
            return None;
        }
        // Check and insert happen under one lock; a parallel branch may
        // have claimed the same address since the filter ran.
        if !self.visited.claim(&address) {
            return None;
        }
        self.emit(SpiderEvent::CollectAddress { address: &address });

        match self.download(&address).await {
            Ok(resource) => {
                let resource = Arc::new(resource);
                self.record(Arc::clone(&resource));
                Some(resource)
            }
            Err(FetchError::Cancelled { .. }) => {
                debug!(url = %address, "download abandoned");
                None
            }
            Err(error) => {
                warn!(url = %address, %error, "download failed");
                self.download_errors.fetch_add(1, Ordering::SeqCst);
                self.emit(SpiderEvent::DownloadError {
                    address: &address,
                    error: &error,
                });
                None
            }
        }
    }

    async fn download(&self, address: &Address) -> Result<Resource, FetchError> {
        let cancelled = || FetchError::Cancelled {
            url: address.as_str().to_string(),
        };

        // The permit only covers the download itself, never the recursion,
        // so nested branches cannot starve each other.
        let _permit = tokio::select! {
            _ = self.cancel.cancelled() => return Err(cancelled()),
            permit = self.permits.acquire() => permit.map_err(|_| cancelled())?,
        };

        debug!(url = %address, "downloading");
        let fetch = async {
            match self.fetch_timeout {
                Some(limit) => tokio::time::timeout(limit, self.fetcher.fetch(address))
                    .await
                    .unwrap_or_else(|_| {
                        Err(FetchError::Timeout {
                            url: address.as_str().to_string(),
                        })
                    }),
                None => self.fetcher.fetch(address).await,
            }
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Err(cancelled()),
            result = fetch => result,
        }
    }

    fn record(&self, resource: Arc<Resource>) {
        if let Ok(mut resources) = self.resources.lock() {
            resources.push(resource);
        }
    }

    fn emit(&self, event: SpiderEvent<'_>) {
        self.dispatcher.dispatch(&event, self);
    }
}

impl std::fmt::Debug for Spider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spider")
            .field("filters", &self.filters)
            .field("dispatcher", &self.dispatcher)
            .field("visited", &self.visited.len())
            .field("max_depth", &self.max_depth)
            .field("concurrency", &self.concurrency)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Depth-first vs breadth-first:
//    - Each page is finished (assets, then its own completion signal) before
//      its page links are followed, and each page link is followed to the
//      end before the next one starts
//    - Observers can rely on "collected-address" meaning "this page and all
//      of its assets are on disk/in memory"
//
// 2. Why claim before announcing?
//    - In parallel mode two branches can both pass the filter for the same
//      link; only the one that wins the claim announces and downloads it
//
// 3. Depth counting:
//    - Only page links add a hop; assets belong to their page's level
//
// 4. Page links found inside an asset (an HTML frame, say) are crawled
//    inside that asset's branch, before its page reports "collected-asset-addresses"
// -----------------------------------------------------------------------------
