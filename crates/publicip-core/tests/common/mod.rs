//! Test doubles and common utilities for lookup contract tests
//!
//! This module provides minimal test doubles that stand in for the network
//! and the rate limiter without doing any real I/O.

#![allow(dead_code)]

use publicip_core::error::{Error, Result};
use publicip_core::traits::{FetchRequest, FetchResponse, Fetcher, Throttle};
use publicip_core::{ProviderConfig, ProviderSettings};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// What the stub answers with
#[derive(Debug, Clone)]
pub enum Reply {
    /// A complete HTTP response
    Response(FetchResponse),
    /// A transport failure
    Refused(String),
    /// A request timeout
    TimedOut(Duration),
}

/// A Fetcher that returns a canned reply and records every request
pub struct StubFetcher {
    reply: Reply,
    requests: Arc<Mutex<Vec<FetchRequest>>>,
}

impl StubFetcher {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer `200 OK` with the given JSON body
    pub fn ok_json(body: &str) -> Self {
        Self::status(200, "200 OK", body)
    }

    pub fn status(code: u16, status: &str, body: &str) -> Self {
        Self::new(Reply::Response(FetchResponse {
            code,
            status: status.to_string(),
            body: body.as_bytes().to_vec(),
        }))
    }

    /// Number of times fetch() was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.reply {
            Reply::Response(response) => Ok(response.clone()),
            Reply::Refused(message) => Err(Error::transport(message.clone())),
            Reply::TimedOut(timeout) => Err(Error::Timeout(*timeout)),
        }
    }
}

/// A Throttle that always grants a permit and counts acquisitions
#[derive(Debug, Default)]
pub struct CountingThrottle {
    acquired: AtomicUsize,
}

impl CountingThrottle {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Throttle for CountingThrottle {
    fn try_acquire(&self) -> bool {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        true
    }

    async fn acquire(&self, _deadline: Instant) -> Result<()> {
        self.try_acquire();
        Ok(())
    }
}

/// A Throttle that never grants a permit
#[derive(Debug, Default)]
pub struct ExhaustedThrottle;

#[async_trait::async_trait]
impl Throttle for ExhaustedThrottle {
    fn try_acquire(&self) -> bool {
        false
    }

    async fn acquire(&self, deadline: Instant) -> Result<()> {
        tokio::time::sleep_until(deadline).await;
        Err(Error::rate_limit_timeout("exhausted"))
    }
}

/// Default configuration with the given throttle
pub fn config_with(throttle: Arc<dyn Throttle>) -> Arc<ProviderConfig> {
    let config = ProviderConfig::from_settings(&ProviderSettings::default(), "publicip", "test")
        .expect("default settings resolve");
    Arc::new(config.with_throttle(throttle))
}

/// Configuration with a short timeout and the given throttle
pub fn short_timeout_config(throttle: Arc<dyn Throttle>) -> Arc<ProviderConfig> {
    let settings = ProviderSettings {
        timeout: Some("20ms".to_string()),
        ..Default::default()
    };
    let config = ProviderConfig::from_settings(&settings, "publicip", "test")
        .expect("short timeout resolves");
    Arc::new(config.with_throttle(throttle))
}
