// src/fetcher/http.rs
// =============================================================================
// This module downloads resources over HTTP.
//
// Key functionality:
// - Makes HTTP GET requests with a timeout and a limited redirect policy
// - Treats any non-2xx status as a failed download
// - Sorts transport failures into timeouts, DNS, SSL and connection errors
// - Hands the body to the ResourceFactory, which picks the content kind
//
// Rust concepts:
// - async/await: For network I/O
// - Traits: HttpFetcher is one implementation of the Fetcher trait
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use super::{Fetcher, ResponseMeta};
use crate::address::{Address, RESPONSE_PARAMETER};
use crate::error::FetchError;
use crate::resource::{Resource, ResourceFactory};

/// Settings for the reqwest client.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_redirects: 5,
            user_agent: concat!("link-spider/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    factory: ResourceFactory,
}

impl HttpFetcher {
    pub fn new(options: HttpOptions) -> Result<Self, reqwest::Error> {
        Self::with_factory(options, ResourceFactory::default())
    }

    pub fn with_factory(options: HttpOptions, factory: ResourceFactory) -> Result<Self, reqwest::Error> {
        // We'll reuse this client for all requests (connection pooling)
        let client = Client::builder()
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::limited(options.max_redirects))
            .user_agent(options.user_agent)
            .build()?;
        Ok(Self { client, factory })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, address: &Address) -> Result<Resource, FetchError> {
        let url = address.as_str();

        let response = self
            .client
            .get(address.url().clone())
            .send()
            .await
            .map_err(|e| categorize_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let meta = ResponseMeta {
            status: status.as_u16(),
            final_url: response.url().to_string(),
            content_type: content_type.clone(),
            content_length: response.content_length(),
        };

        let body = response
            .bytes()
            .await
            .map_err(|e| categorize_error(url, e))?;

        let fetched = address.clone().with_parameter(RESPONSE_PARAMETER, meta);
        let extension_hint = address.extension().map(str::to_string);

        Ok(self.factory.create(
            fetched,
            Some(body.to_vec()),
            content_type.unwrap_or_default(),
            extension_hint,
        ))
    }
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
fn categorize_error(url: &str, error: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if error.is_timeout() {
        return FetchError::Timeout { url };
    }

    let error_string = error.to_string();
    let message = if error.is_redirect() {
        "Too many redirects".to_string()
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") {
            "Could not resolve hostname".to_string()
        } else {
            "Connection failed".to_string()
        }
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    };

    FetchError::Transport { url, message }
}
