// src/resource/markdown.rs
// =============================================================================
// This module extracts links from Markdown text.
//
// We use the `pulldown-cmark` crate which:
// - Parses Markdown into events (heading, paragraph, link, etc.)
// - Follows the CommonMark specification
// - Is fast and memory-efficient (it's a streaming parser)
//
// [text](target) becomes a page link, ![alt](target) an asset link.
// Relative targets are kept as written; the Resource resolves them.
// =============================================================================

use pulldown_cmark::{Event, LinkType, Parser, Tag};

use super::kind::RawLinks;

pub fn extract_markdown_links(markdown: &str) -> RawLinks {
    let mut links = RawLinks::default();

    for event in Parser::new(markdown) {
        match event {
            // <user@example.com> autolinks carry the bare address, not a URL
            Event::Start(Tag::Link(LinkType::Email, _, _)) => {}
            Event::Start(Tag::Link(_link_type, dest_url, _title)) => {
                links.pages.push(dest_url.to_string());
            }
            Event::Start(Tag::Image(_link_type, dest_url, _title)) => {
                links.assets.push(dest_url.to_string());
            }
            _ => {}
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_links_and_images() {
        let markdown = r#"
# Resources

- [Rust](https://www.rust-lang.org)
- [Guide](./guide.md)

![logo](img/logo.png)
        "#;
        let links = extract_markdown_links(markdown);
        assert_eq!(links.pages, vec!["https://www.rust-lang.org", "./guide.md"]);
        assert_eq!(links.assets, vec!["img/logo.png"]);
    }

    #[test]
    fn test_reference_links() {
        let markdown = "See [the docs][docs].\n\n[docs]: https://docs.rs/\n";
        let links = extract_markdown_links(markdown);
        assert_eq!(links.pages, vec!["https://docs.rs/"]);
    }

    #[test]
    fn test_skip_email_autolinks() {
        let markdown = "Email me at <test@example.com>";
        let links = extract_markdown_links(markdown);
        assert!(links.pages.is_empty());
    }
}
