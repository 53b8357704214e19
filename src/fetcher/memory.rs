// src/fetcher/memory.rs
// =============================================================================
// A Fetcher that serves canned responses from memory.
//
// Used by the test suite to drive full crawls without a network, and handy
// for trying out filters against a known site layout. Unknown URLs answer
// with a 404 FetchError, like a real server would.
// =============================================================================

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Fetcher, ResponseMeta};
use crate::address::{Address, RESPONSE_PARAMETER};
use crate::error::FetchError;
use crate::resource::{Resource, ResourceFactory};

#[derive(Debug, Clone)]
enum Canned {
    Body { content_type: String, body: Vec<u8> },
    Status(u16),
    Transport(String),
}

#[derive(Debug, Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Canned>,
    requests: Mutex<Vec<String>>,
    factory: ResourceFactory,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` with `content_type` for `url`.
    pub fn with_body(mut self, url: &str, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(
            key_for(url),
            Canned::Body {
                content_type: content_type.to_string(),
                body: body.into(),
            },
        );
        self
    }

    pub fn with_html(self, url: &str, html: &str) -> Self {
        self.with_body(url, "text/html; charset=utf-8", html)
    }

    /// Answers `url` with a non-success HTTP status.
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(key_for(url), Canned::Status(status));
        self
    }

    /// Fails `url` as if the connection broke.
    pub fn with_transport_error(mut self, url: &str, message: &str) -> Self {
        self.responses
            .insert(key_for(url), Canned::Transport(message.to_string()));
        self
    }

    pub fn with_factory(mut self, factory: ResourceFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Every URL asked for so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, address: &Address) -> Result<Resource, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(address.as_str().to_string());
        }

        let url = address.as_str().to_string();
        match self.responses.get(address.key()) {
            Some(Canned::Body { content_type, body }) => {
                let meta = ResponseMeta {
                    status: 200,
                    final_url: url,
                    content_type: Some(content_type.clone()),
                    content_length: Some(body.len() as u64),
                };
                let fetched = address.clone().with_parameter(RESPONSE_PARAMETER, meta);
                Ok(self.factory.create(
                    fetched,
                    Some(body.clone()),
                    content_type.clone(),
                    address.extension().map(str::to_string),
                ))
            }
            Some(Canned::Status(status)) => Err(FetchError::Status {
                url,
                status: *status,
            }),
            Some(Canned::Transport(message)) => Err(FetchError::Transport {
                url,
                message: message.clone(),
            }),
            None => Err(FetchError::Status { url, status: 404 }),
        }
    }
}

fn key_for(url: &str) -> String {
    Address::parse(url)
        .map(|address| address.key().to_string())
        .unwrap_or_else(|_| url.to_string())
}
