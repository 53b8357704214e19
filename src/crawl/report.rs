// src/crawl/report.rs
// =============================================================================
// What a finished (or cancelled) crawl hands back to the caller.
//
// The report keeps every downloaded resource in download order, plus the
// failure count and whether the crawl was cut short. `ResourceSummary` is the
// flat, serializable row the CLI prints as a table or JSON.
// =============================================================================

use std::sync::Arc;

use serde::Serialize;

use crate::resource::{ContentKind, Resource};

#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Every downloaded resource, in download order.
    pub resources: Vec<Arc<Resource>>,
    /// Downloads that failed (each one also raised a download-error signal).
    pub download_errors: usize,
    pub cancelled: bool,
}

impl CrawlReport {
    pub fn is_clean(&self) -> bool {
        self.download_errors == 0 && !self.cancelled
    }

    pub fn summaries(&self) -> Vec<ResourceSummary> {
        self.resources
            .iter()
            .map(|resource| ResourceSummary::from(resource.as_ref()))
            .collect()
    }
}

/// One row of the report, as printed in the table or serialized to JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub url: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    pub kind: ContentKind,
    pub binary: bool,
    pub pages: usize,
    pub assets: usize,
}

impl From<&Resource> for ResourceSummary {
    fn from(resource: &Resource) -> Self {
        Self {
            url: resource.address().as_str().to_string(),
            content_type: resource.content_type().to_string(),
            extension: resource.extension().map(str::to_string),
            kind: resource.kind(),
            binary: resource.is_binary(),
            pages: resource.page_addresses().len(),
            assets: resource.asset_addresses().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;

    #[test]
    fn test_summary_serializes() {
        let resource = Resource::new(
            Address::parse("https://example.com/").unwrap(),
            Some(br#"<a href="/a">a</a><img src="b.png">"#.to_vec()),
            "text/html",
        );
        let report = CrawlReport {
            resources: vec![Arc::new(resource)],
            download_errors: 0,
            cancelled: false,
        };
        assert!(report.is_clean());

        let json = serde_json::to_value(report.summaries()).unwrap();
        assert_eq!(json[0]["url"], "https://example.com/");
        assert_eq!(json[0]["kind"], "html");
        assert_eq!(json[0]["extension"], "html");
        assert_eq!(json[0]["pages"], 1);
        assert_eq!(json[0]["assets"], 1);
    }
}
