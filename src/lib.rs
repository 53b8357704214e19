// src/lib.rs
// =============================================================================
// link-spider: a recursive web spider.
//
// Give it a seed address and a Fetcher; it downloads the resource, finds the
// links in it, filters them, and keeps going, telling observers what it is
// doing along the way.
//
// Modules, leaves first:
// - address:  parsing, resolution and canonical form of addresses
// - visited:  the set of addresses already dispatched
// - resource: fetched bodies and the links they declare
// - filter:   which discovered links are worth downloading
// - fetcher:  the download capability (HTTP and in-memory)
// - events:   lifecycle signals and observers
// - crawl:    the Spider that ties it all together
// =============================================================================

pub mod address;
pub mod crawl;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod filter;
pub mod resource;
pub mod visited;

pub use address::{Address, Parameters, PAGE_PARAMETER, RESPONSE_PARAMETER};
pub use crawl::{CrawlReport, ResourceSummary, Spider, SpiderConfig};
pub use error::{AddressError, FetchError, SpiderError, SpiderResult};
pub use events::{LoggingObserver, Observer, RecordingObserver, Signal, SpiderEvent};
pub use fetcher::{Fetcher, HttpFetcher, HttpOptions, MemoryFetcher, ResponseMeta};
pub use filter::{FilterHook, FilterPipeline, Verdict};
pub use resource::{ContentKind, ContentKindRegistry, MimeRegistry, Resource, ResourceFactory, StaticMimeRegistry};
pub use visited::VisitedRegistry;
