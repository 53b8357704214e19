// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, filtered by RUST_LOG)
// 3. Build a spider around the HTTP fetcher and run it
// 4. Print the collected resources
// 5. Exit with proper code (0 = clean crawl, 1 = some downloads failed, 2 = error)
// =============================================================================

mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use link_spider::{
    Address, CrawlReport, HttpFetcher, HttpOptions, LoggingObserver, ResourceSummary, Spider,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "info,link_spider=debug"
    } else {
        "info,link_spider=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let config = cli.command.spider_config();
    match cli.command {
        Commands::Crawl {
            seed,
            same_origin,
            json,
            ..
        } => {
            let config = config.context("crawl settings missing")?;
            handle_crawl(&seed, config, same_origin, json).await
        }
        Commands::Resolve { base, link } => handle_resolve(&base, &link),
    }
}

async fn handle_crawl(
    seed: &str,
    config: link_spider::SpiderConfig,
    same_origin: bool,
    json: bool,
) -> Result<i32> {
    let seed_address =
        Address::parse(seed).with_context(|| format!("Invalid seed URL '{}'", seed))?;

    let fetcher = HttpFetcher::new(HttpOptions {
        timeout: config.fetch_timeout.unwrap_or(Duration::from_secs(10)),
        ..HttpOptions::default()
    })
    .context("Failed to create HTTP client")?;

    let mut spider = Spider::with_config(Arc::new(fetcher), config)
        .context("Invalid crawl settings")?;
    spider.subscribe(LoggingObserver);
    if same_origin {
        spider.restrict_to_origin(seed_address.origin());
    }

    // Ctrl-C stops the crawl but still prints what was collected
    let token = spider.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, finishing up");
            token.cancel();
        }
    });

    let report = spider.run(seed).await?;
    print_report(&report, json)?;

    if report.is_clean() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn handle_resolve(base: &str, link: &str) -> Result<i32> {
    let base = Address::parse(base).with_context(|| format!("Invalid base URL '{}'", base))?;
    let resolved = Address::resolve(link, &base)?;
    println!("{}", resolved);
    Ok(0)
}

// Prints the report either as a table or JSON
fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    let summaries = report.summaries();
    if json {
        let output = serde_json::json!({
            "resources": summaries,
            "download_errors": report.download_errors,
            "cancelled": report.cancelled,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_table(&summaries, report);
    }
    Ok(())
}

fn print_table(summaries: &[ResourceSummary], report: &CrawlReport) {
    println!("{:<60} {:<24} {:<10} {:>6} {:>7}", "URL", "CONTENT TYPE", "KIND", "PAGES", "ASSETS");
    println!("{}", "=".repeat(111));

    for summary in summaries {
        // Truncate URL if too long for display
        let url_display = if summary.url.len() > 57 {
            format!("{}...", &summary.url[..57])
        } else {
            summary.url.clone()
        };
        let content_type = summary.content_type.split(';').next().unwrap_or_default();

        println!(
            "{:<60} {:<24} {:<10} {:>6} {:>7}",
            url_display,
            content_type,
            summary.kind.name(),
            summary.pages,
            summary.assets
        );
    }

    println!();
    println!("📊 Summary:");
    println!("   📄 Collected: {}", summaries.len());
    println!("   ❌ Download errors: {}", report.download_errors);
    if report.cancelled {
        println!("   ⏹️  Cancelled before completion");
    }
}
