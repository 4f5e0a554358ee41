//! Cache-backed retrieval of remote resources
//!
//! `CachedFetcher` memoizes an expensive retrieval keyed by locator (a URL).
//! A body still held by the `ExpiringCache` is always preferred over a new
//! round trip; failures are handed back to the caller and never cached.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use super::ExpiringCache;

/// Errors that can occur while retrieving a resource
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Request to {locator} failed with status {status}")]
    Status { locator: String, status: u16 },

    /// The resource could not be retrieved for another reason
    #[error("Resource unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    /// Whether the server reported that the resource does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status == 404,
            FetchError::Http(err) => err.status().map(|s| s.as_u16()) == Some(404),
            FetchError::Unavailable(_) => false,
        }
    }
}

/// Retrieves the raw body behind a locator
///
/// Implementations either return the whole body or fail; retries are not the
/// caller's concern.
#[async_trait]
pub trait Retrieve: Send + Sync {
    async fn retrieve(&self, locator: &str) -> Result<Bytes, FetchError>;
}

/// Memoizing front for a `Retrieve` implementation
#[derive(Debug, Clone)]
pub struct CachedFetcher<R> {
    cache: ExpiringCache,
    retriever: R,
}

impl<R: Retrieve> CachedFetcher<R> {
    pub fn new(cache: ExpiringCache, retriever: R) -> Self {
        Self { cache, retriever }
    }

    /// Returns the body for `locator`, from cache when present
    ///
    /// # Behavior
    /// - On a hit, returns the cached bytes without contacting the origin
    /// - On a miss, retrieves the body, stores it under `locator`, then returns it
    /// - On a failed retrieval, returns the error and leaves the cache untouched
    ///
    /// The cache lock is not held while retrieving, so two callers missing on
    /// the same locator at once may both retrieve it; the last store wins.
    pub async fn resolve(&self, locator: &str) -> Result<Bytes, FetchError> {
        if let Some(body) = self.cache.get(locator) {
            debug!(locator, "cache hit");
            return Ok(body);
        }

        debug!(locator, "cache miss");
        let body = match self.retriever.retrieve(locator).await {
            Ok(body) => body,
            Err(err) => {
                warn!(locator, error = %err, "retrieval failed");
                return Err(err);
            }
        };

        self.cache.put(locator, body.clone());
        Ok(body)
    }
}
