//! HTTP transport used by the cache to reach providers.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::errors::RatesError;

/// `GET url -> JSON body`.
///
/// Every failure mode (non-success status, malformed JSON, I/O error) is an
/// `Err`; the cache treats them all as "this provider failed".
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, RatesError>;
}

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reqwest-backed transport.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> Result<Value, RatesError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RatesError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| RatesError::Network(format!("invalid JSON body from {}: {}", url, e)))
    }
}

#[derive(Clone)]
enum Canned {
    Body(Value),
    Status(u16),
    NetworkError,
    Hang,
}

/// Transport with canned responses per URL. Used by tests.
///
/// Unknown URLs fail with a network error.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Canned>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&self, url: &str, canned: Canned) {
        self.responses
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(url.to_string(), canned);
    }

    pub fn respond(&self, url: &str, body: Value) -> &Self {
        self.put(url, Canned::Body(body));
        self
    }

    pub fn respond_status(&self, url: &str, status: u16) -> &Self {
        self.put(url, Canned::Status(status));
        self
    }

    pub fn fail(&self, url: &str) -> &Self {
        self.put(url, Canned::NetworkError);
        self
    }

    /// Never answers; exercises the cache's per-attempt timeout.
    pub fn hang(&self, url: &str) -> &Self {
        self.put(url, Canned::Hang);
        self
    }

    /// Number of requests made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get_json(&self, url: &str) -> Result<Value, RatesError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(url.to_string());

        let canned = self
            .responses
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(url)
            .cloned();

        match canned {
            Some(Canned::Body(body)) => Ok(body),
            Some(Canned::Status(status)) => Err(RatesError::Http {
                url: url.to_string(),
                status,
            }),
            Some(Canned::Hang) => {
                std::future::pending::<()>().await;
                Err(RatesError::Network("unreachable".to_string()))
            }
            Some(Canned::NetworkError) | None => {
                Err(RatesError::Network(format!("connection refused: {}", url)))
            }
        }
    }
}
