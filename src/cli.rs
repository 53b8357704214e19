// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use std::time::Duration;

use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use link_spider::SpiderConfig;

#[derive(Parser, Debug)]
#[command(
    name = "link-spider",
    version,
    about = "Recursively crawl a website, collecting pages and their assets",
    long_about = "link-spider starts from a seed URL, downloads it, follows the links it finds \
                  and downloads the assets each page owns (images, scripts, stylesheets). \
                  Allow/deny patterns are regular expressions matched against links as written \
                  in the page."
)]
pub struct Cli {
    /// Log every crawl step (same as RUST_LOG=link_spider=debug)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website starting from a seed URL
    ///
    /// Example: link-spider crawl https://example.com --max-depth 2 --deny '^/admin'
    Crawl {
        /// Seed URL (e.g., https://example.com)
        seed: String,

        /// Always crawl links matching this pattern (repeatable)
        #[arg(long = "allow", value_name = "REGEX")]
        allow: Vec<String>,

        /// Skip links matching this pattern unless allowed (repeatable)
        #[arg(long = "deny", value_name = "REGEX")]
        deny: Vec<String>,

        /// Maximum page hops from the seed
        ///
        /// Depth 1 = just the seed page and its assets
        /// Depth 2 = seed page + all pages it links to
        #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
        max_depth: Option<usize>,

        /// Downloads in flight at once (1 = strictly sequential)
        #[arg(long, default_value_t = 1)]
        concurrency: usize,

        /// Per-download timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,

        /// Only crawl addresses on the seed's origin
        #[arg(long)]
        same_origin: bool,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show how a link resolves against a page URL
    ///
    /// Example: link-spider resolve https://example.com/docs/index.html ../img/a.png
    Resolve {
        /// URL of the page the link appears on
        base: String,

        /// Link text as written in the page
        link: String,
    },
}

impl Commands {
    /// Spider settings for the `crawl` subcommand.
    pub fn spider_config(&self) -> Option<SpiderConfig> {
        match self {
            Commands::Crawl {
                allow,
                deny,
                max_depth,
                concurrency,
                timeout,
                ..
            } => Some(SpiderConfig {
                allow_patterns: allow.clone(),
                deny_patterns: deny.clone(),
                max_depth: *max_depth,
                concurrency: (*concurrency).max(1),
                fetch_timeout: Some(Duration::from_secs(*timeout)),
            }),
            Commands::Resolve { .. } => None,
        }
    }
}
