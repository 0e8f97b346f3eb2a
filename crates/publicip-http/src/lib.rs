// # HTTP Transport
//
// This crate provides the reqwest-based [`Fetcher`] for the public IP lookup.
//
// ## Behaviour
//
// - Sends exactly one GET per `fetch` call, never retries
// - Dials with the family and source address of the request's constraint
// - Bounds the whole request/response cycle by the request timeout
// - Returns non-200 responses unchanged, the lookup decides what they mean
//
// ## Connection Pooling
//
// One `reqwest::Client` (and therefore one connection pool) is kept per
// network constraint. Lookups with the same family and source address share
// connections; a different combination gets its own client.

mod client;

use async_trait::async_trait;
use publicip_core::traits::{FetchRequest, FetchResponse, Fetcher};
use publicip_core::{Error, Lookup, NetworkConstraint, ProviderConfig, Result};
use reqwest::header::USER_AGENT;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// reqwest-based fetcher
#[derive(Debug, Default)]
pub struct HttpFetcher {
    /// One client per constraint combination
    clients: Mutex<HashMap<NetworkConstraint, reqwest::Client>>,
}

impl HttpFetcher {
    /// Create a new fetcher with an empty client pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct clients built so far
    pub async fn pooled_clients(&self) -> usize {
        self.clients.lock().await.len()
    }

    async fn client_for(&self, constraint: &NetworkConstraint) -> Result<reqwest::Client> {
        let mut clients = self.clients.lock().await;

        if let Some(client) = clients.get(constraint) {
            return Ok(client.clone());
        }

        let client = client::build(constraint)?;
        clients.insert(*constraint, client.clone());
        Ok(client)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        client::check_literal_host(&request.url, &request.constraint)?;
        let client = self.client_for(&request.constraint).await?;

        let response = client
            .get(request.url.clone())
            .header(USER_AGENT, &request.user_agent)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| transport_error(&e, request))?;

        let status = response.status();
        tracing::debug!("Response from {}: {}", request.url, status);

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(&e, request))?;

        Ok(FetchResponse {
            code: status.as_u16(),
            status: status.to_string(),
            body: body.to_vec(),
        })
    }
}

/// Create a lookup backed by a fresh [`HttpFetcher`]
pub fn lookup(config: Arc<ProviderConfig>) -> Lookup<HttpFetcher> {
    Lookup::new(config, HttpFetcher::new())
}

fn transport_error(err: &reqwest::Error, request: &FetchRequest) -> Error {
    if err.is_timeout() {
        return Error::Timeout(request.timeout);
    }

    Error::transport(format!(
        "There was an error when contacting '{}': {}",
        request.url,
        error_chain(err)
    ))
}

/// Render an error with all its sources, reqwest's top level message is terse
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
