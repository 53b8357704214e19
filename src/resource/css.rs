// src/resource/css.rs
// =============================================================================
// Link extraction for stylesheets.
//
// A stylesheet owns the targets of its url(...) and @import rules (images,
// fonts, other stylesheets) as assets. It never links pages.
// =============================================================================

use std::sync::OnceLock;

use regex::Regex;

use super::kind::RawLinks;

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"url\(\s*['"]?([^'")\s]+)['"]?\s*\)"#).unwrap())
}

fn import_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"@import\s+['"]([^'"]+)['"]"#).unwrap())
}

pub fn extract_css_links(css: &str) -> RawLinks {
    // (offset, link) so both patterns merge back into source order
    let mut found: Vec<(usize, &str)> = url_pattern()
        .captures_iter(css)
        .chain(import_pattern().captures_iter(css))
        .filter_map(|caps| caps.get(1))
        .map(|m| (m.start(), m.as_str()))
        .collect();
    found.sort_by_key(|(offset, _)| *offset);

    RawLinks {
        pages: Vec::new(),
        assets: found.into_iter().map(|(_, link)| link.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_urls_and_imports() {
        let css = r#"
            @import "reset.css";
            body { background: url('img/bg.png') no-repeat; }
            @font-face { src: url(fonts/a.woff2) format("woff2"); }
        "#;
        let links = extract_css_links(css);
        assert_eq!(links.assets, vec!["reset.css", "img/bg.png", "fonts/a.woff2"]);
        assert!(links.pages.is_empty());
    }
}
