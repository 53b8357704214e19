// tests/crawl.rs
// =============================================================================
// End-to-end crawls through the public API, served from memory.
// =============================================================================

use std::sync::{Arc, Mutex};

use link_spider::{
    Address, ContentKind, MemoryFetcher, RecordingObserver, ResponseMeta, Signal, Spider,
    SpiderConfig, SpiderEvent, VisitedRegistry, RESPONSE_PARAMETER,
};

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

fn mixed_site() -> MemoryFetcher {
    MemoryFetcher::new()
        .with_html(
            "https://example.com/index.html",
            r##"<html><head><link rel="stylesheet" href="css/site.css"></head>
               <body><img src="img/logo.png"><a href="docs/readme.md">docs</a>
               <a href="mailto:me@example.com">mail</a><a href="#top">top</a></body></html>"##,
        )
        .with_body(
            "https://example.com/css/site.css",
            "text/css",
            "body { background: url(../img/bg.png) }",
        )
        .with_body("https://example.com/img/bg.png", "image/png", PNG)
        .with_body("https://example.com/img/logo.png", "image/png", PNG)
        .with_body(
            "https://example.com/docs/readme.md",
            "text/markdown",
            "# Docs\n\n![diagram](diagram.png)\n\n[Home](../index.html)\n",
        )
        .with_body("https://example.com/docs/diagram.png", "image/png", PNG)
}

#[tokio::test]
async fn nested_assets_finish_before_their_page() {
    let fetcher = Arc::new(mixed_site());
    let recorder = Arc::new(RecordingObserver::new());
    let mut spider = Spider::new(fetcher.clone());
    spider.subscribe_shared(recorder.clone());

    let report = spider.run("https://example.com/index.html").await.unwrap();

    assert_eq!(
        fetcher.requests(),
        vec![
            "https://example.com/index.html",
            "https://example.com/css/site.css",
            "https://example.com/img/bg.png",
            "https://example.com/img/logo.png",
            "https://example.com/docs/readme.md",
            "https://example.com/docs/diagram.png",
        ]
    );
    assert_eq!(
        recorder.urls_for(Signal::CollectedAddress),
        vec![
            "https://example.com/img/bg.png",
            "https://example.com/css/site.css",
            "https://example.com/img/logo.png",
            "https://example.com/index.html",
            "https://example.com/docs/diagram.png",
            "https://example.com/docs/readme.md",
        ]
    );

    let kinds: Vec<_> = report.resources.iter().map(|r| r.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ContentKind::Html,
            ContentKind::Css,
            ContentKind::Default,
            ContentKind::Default,
            ContentKind::Markdown,
            ContentKind::Default,
        ]
    );
    assert!(report.is_clean());
}

#[tokio::test]
async fn observers_see_the_response_and_referrer() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let mut spider = Spider::new(Arc::new(mixed_site()));
    spider.on_event(move |event, _spider| {
        if let SpiderEvent::CollectedAddress { resource, .. } = event {
            let address = resource.address();
            let status = address
                .parameter::<ResponseMeta>(RESPONSE_PARAMETER)
                .map(|meta| meta.status);
            let referrer = address.referrer().map(|url| url.to_string());
            sink.lock().unwrap().push((address.to_string(), status, referrer));
        }
    });

    spider.run("https://example.com/index.html").await.unwrap();

    let seen = seen.lock().unwrap();
    let logo = seen
        .iter()
        .find(|(url, _, _)| url.ends_with("logo.png"))
        .unwrap();
    assert_eq!(logo.1, Some(200));
    assert_eq!(logo.2.as_deref(), Some("https://example.com/index.html"));

    let index = seen
        .iter()
        .find(|(url, _, _)| url.ends_with("index.html"))
        .unwrap();
    assert_eq!(index.2, None);
}

#[tokio::test]
async fn shared_registry_spans_sessions() {
    let visited = Arc::new(VisitedRegistry::new());

    let first = Arc::new(mixed_site());
    let spider = Spider::new(first.clone()).with_visited(visited.clone());
    spider.run("https://example.com/index.html").await.unwrap();
    assert_eq!(first.requests().len(), 6);

    let second = Arc::new(mixed_site());
    let spider = Spider::new(second.clone()).with_visited(visited.clone());
    let report = spider.run("https://example.com/index.html").await.unwrap();
    assert!(second.requests().is_empty());
    assert!(report.resources.is_empty());

    let third = Arc::new(mixed_site());
    let spider = Spider::new(third.clone());
    spider.run("https://example.com/index.html").await.unwrap();
    assert_eq!(third.requests().len(), 6);
}

#[tokio::test]
async fn deny_binary_assets_by_extension() {
    let fetcher = Arc::new(mixed_site());
    let config = SpiderConfig::new().deny(r"\.png$");
    let spider = Spider::with_config(fetcher.clone(), config).unwrap();

    let report = spider.run("https://example.com/index.html").await.unwrap();

    assert!(fetcher.requests().iter().all(|url| !url.ends_with(".png")));
    assert_eq!(report.resources.len(), 3);
}

#[tokio::test]
async fn seed_with_fragment_is_fetched_once() {
    let fetcher = Arc::new(mixed_site());
    let spider = Spider::new(fetcher.clone());

    spider.run("https://example.com/index.html#intro").await.unwrap();

    let index = Address::parse("https://example.com/index.html").unwrap();
    assert!(spider.visited().is_visited(&index));
    let fetches = fetcher
        .requests()
        .into_iter()
        .filter(|url| url.contains("index.html"))
        .count();
    assert_eq!(fetches, 1);
}

#[tokio::test]
async fn ten_thousand_page_chain_completes() {
    const PAGES: usize = 10_000;
    let mut fetcher = MemoryFetcher::new();
    for i in 0..PAGES {
        let body = if i + 1 < PAGES {
            format!(r#"<a href="/p{}">next</a>"#, i + 1)
        } else {
            "<p>the end</p>".to_string()
        };
        fetcher = fetcher.with_html(&format!("http://example.com/p{i}"), &body);
    }
    let fetcher = Arc::new(fetcher);
    let spider = Spider::new(fetcher.clone());

    let report = spider.run("http://example.com/p0").await.unwrap();

    assert_eq!(fetcher.requests().len(), PAGES);
    assert_eq!(report.resources.len(), PAGES);
    assert!(report.is_clean());
    assert_eq!(
        report.resources.last().map(|r| r.address().as_str().to_string()),
        Some(format!("http://example.com/p{}", PAGES - 1))
    );
}
