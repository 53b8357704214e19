// src/resource/html.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Links are split into two groups:
// - page links:  <a href>, <area href>, <frame src>, <iframe src>
// - asset links: <img src>, <script src>, <link rel=stylesheet|icon href>,
//                <source src>, <video src>, <audio src>, <embed src>
//
// Only the raw attribute text is returned here. Resolving it against the
// page's address happens in the Resource, so allow/deny patterns still see
// the link exactly as the author wrote it.
// =============================================================================

use scraper::{ElementRef, Html, Selector};

use super::kind::RawLinks;

const PAGE_SELECTOR: &str = "a[href], area[href], frame[src], iframe[src]";

const ASSET_SELECTOR: &str = "img[src], script[src], \
     link[rel~=stylesheet][href], link[rel~=icon][href], link[rel~=preload][href], \
     source[src], video[src], audio[src], embed[src]";

// Extracts raw page and asset links from HTML content, in document order
pub fn extract_html_links(html: &str) -> RawLinks {
    // Parse the HTML into a document
    let document = Html::parse_document(html);

    RawLinks {
        pages: select_links(&document, PAGE_SELECTOR),
        assets: select_links(&document, ASSET_SELECTOR),
    }
}

// Runs a selector group over the document and reads the link attribute of
// every match. A selector group yields elements in document order.
fn select_links(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(link_attribute)
        .map(str::to_string)
        .collect()
}

// <a>, <area> and <link> point with href; everything else uses src
fn link_attribute(element: ElementRef<'_>) -> Option<&str> {
    let value = element.value();
    match value.name() {
        "a" | "area" | "link" => value.attr("href"),
        _ => value.attr("src"),
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why not <link href> in general?
//    - rel=canonical / rel=alternate point at other pages, not sub-resources
//    - Only stylesheets, icons and preloads are owned by the page
//
// 2. Why keep duplicates here?
//    - De-duplication of the raw text happens once, in the Resource, for
//      every content kind
// -----------------------------------------------------------------------------
