//! Shared HTTP client with connection pooling.
//!
//! Wraps `reqwest::Client`. The client is safe to clone (internally `Arc`-ed)
//! and can be shared across tasks. No overall request timeout is set:
//! resumable chunk transfers may legitimately take longer than any fixed
//! per-request budget, so only connect and pool timeouts apply.

use std::time::Duration;

use crate::errors::{DriveError, Result};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
const MAX_IDLE_PER_HOST: usize = 8;

/// A shared HTTP client for all Drive API calls.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Build a new `HttpClient` with the sample's pooling defaults.
    pub fn new() -> Result<Self> {
        let inner = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS))
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .build()
            .map_err(DriveError::Http)?;
        Ok(Self { inner })
    }

    /// Get a reference to the underlying `reqwest::Client`.
    ///
    /// `reqwest::Client` is internally `Arc`-ed, so cloning it is cheap.
    pub fn client(&self) -> &reqwest::Client {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds() {
        let client = HttpClient::new().expect("should build with defaults");
        let _inner = client.client();
    }

    #[test]
    fn test_clone_is_cheap() {
        let client = HttpClient::new().expect("should build");
        let cloned = client.clone();
        let _a = client.client();
        let _b = cloned.client();
    }
}
