// src/events.rs
// =============================================================================
// Lifecycle signals published by the spider.
//
// Observers are called synchronously, in subscription order, and run to
// completion before the crawl moves on. Every event carries the address it is
// about, and the spider is passed along as the subject.
//
//   filter-address            a link reached the hook stage of the filter
//   collect-address           a link passed the filter, download is next
//   collect-asset-addresses   page downloaded, its assets are about to be crawled
//   collected-asset-addresses all of the page's assets are done
//   collected-address         the page is done (carries the resource)
//   download-error            the download failed
// =============================================================================

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::address::Address;
use crate::crawl::Spider;
use crate::error::FetchError;
use crate::resource::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    FilterAddress,
    CollectAddress,
    CollectedAddress,
    CollectAssetAddresses,
    CollectedAssetAddresses,
    DownloadError,
}

impl Signal {
    pub fn name(self) -> &'static str {
        match self {
            Signal::FilterAddress => "filter-address",
            Signal::CollectAddress => "collect-address",
            Signal::CollectedAddress => "collected-address",
            Signal::CollectAssetAddresses => "collect-asset-addresses",
            Signal::CollectedAssetAddresses => "collected-asset-addresses",
            Signal::DownloadError => "download-error",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SpiderEvent<'a> {
    FilterAddress {
        address: &'a Address,
    },
    CollectAddress {
        address: &'a Address,
    },
    CollectedAddress {
        address: &'a Address,
        resource: &'a Arc<Resource>,
    },
    CollectAssetAddresses {
        address: &'a Address,
        resource: &'a Arc<Resource>,
    },
    CollectedAssetAddresses {
        address: &'a Address,
        resource: &'a Arc<Resource>,
    },
    DownloadError {
        address: &'a Address,
        error: &'a FetchError,
    },
}

impl<'a> SpiderEvent<'a> {
    pub fn signal(&self) -> Signal {
        match self {
            SpiderEvent::FilterAddress { .. } => Signal::FilterAddress,
            SpiderEvent::CollectAddress { .. } => Signal::CollectAddress,
            SpiderEvent::CollectedAddress { .. } => Signal::CollectedAddress,
            SpiderEvent::CollectAssetAddresses { .. } => Signal::CollectAssetAddresses,
            SpiderEvent::CollectedAssetAddresses { .. } => Signal::CollectedAssetAddresses,
            SpiderEvent::DownloadError { .. } => Signal::DownloadError,
        }
    }

    pub fn address(&self) -> &'a Address {
        match *self {
            SpiderEvent::FilterAddress { address }
            | SpiderEvent::CollectAddress { address }
            | SpiderEvent::CollectedAddress { address, .. }
            | SpiderEvent::CollectAssetAddresses { address, .. }
            | SpiderEvent::CollectedAssetAddresses { address, .. }
            | SpiderEvent::DownloadError { address, .. } => address,
        }
    }

    pub fn resource(&self) -> Option<&'a Arc<Resource>> {
        match *self {
            SpiderEvent::CollectedAddress { resource, .. }
            | SpiderEvent::CollectAssetAddresses { resource, .. }
            | SpiderEvent::CollectedAssetAddresses { resource, .. } => Some(resource),
            _ => None,
        }
    }
}

pub trait Observer: Send + Sync {
    fn notify(&self, event: &SpiderEvent<'_>, spider: &Spider);
}

impl<F> Observer for F
where
    F: Fn(&SpiderEvent<'_>, &Spider) + Send + Sync,
{
    fn notify(&self, event: &SpiderEvent<'_>, spider: &Spider) {
        self(event, spider)
    }
}

/// Ordered list of observers.
#[derive(Default, Clone)]
pub struct Dispatcher {
    observers: Vec<Arc<dyn Observer>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn dispatch(&self, event: &SpiderEvent<'_>, spider: &Spider) {
        for observer in &self.observers {
            observer.notify(event, spider);
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Writes every signal to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl Observer for LoggingObserver {
    fn notify(&self, event: &SpiderEvent<'_>, _spider: &Spider) {
        let signal = event.signal().name();
        let url = event.address().as_str();
        match event {
            SpiderEvent::FilterAddress { .. } => {
                tracing::trace!(signal, url, "filtering");
            }
            SpiderEvent::CollectAddress { address } => {
                tracing::debug!(signal, url, raw = address.raw(), "collecting");
            }
            SpiderEvent::CollectAssetAddresses { resource, .. } => {
                tracing::debug!(signal, url, assets = resource.asset_addresses().len(), "collecting assets");
            }
            SpiderEvent::CollectedAssetAddresses { .. } => {
                tracing::debug!(signal, url, "assets collected");
            }
            SpiderEvent::CollectedAddress { resource, .. } => {
                tracing::info!(
                    signal,
                    url,
                    content_type = resource.content_type(),
                    pages = resource.page_addresses().len(),
                    "collected"
                );
            }
            SpiderEvent::DownloadError { error, .. } => {
                tracing::warn!(signal, url, %error, "download failed");
            }
        }
    }
}

/// Keeps the ordered stream of `(signal, url)` pairs it has seen.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    seen: Mutex<Vec<(Signal, String)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Signal, String)> {
        self.seen
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }

    /// Events of one signal only, as URLs.
    pub fn urls_for(&self, signal: Signal) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(seen, _)| *seen == signal)
            .map(|(_, url)| url)
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn notify(&self, event: &SpiderEvent<'_>, _spider: &Spider) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((event.signal(), event.address().as_str().to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_names() {
        assert_eq!(Signal::FilterAddress.name(), "filter-address");
        assert_eq!(Signal::CollectedAssetAddresses.to_string(), "collected-asset-addresses");
        assert_eq!(Signal::DownloadError.name(), "download-error");
    }

    #[test]
    fn test_event_accessors() {
        let address = Address::parse("https://example.com/").unwrap();
        let error = FetchError::Timeout {
            url: address.as_str().to_string(),
        };
        let event = SpiderEvent::DownloadError {
            address: &address,
            error: &error,
        };
        assert_eq!(event.signal(), Signal::DownloadError);
        assert_eq!(event.address(), &address);
        assert!(event.resource().is_none());
    }
}
