//! Typed PokeAPI client
//!
//! Builds locators for list and detail lookups, resolves them through a
//! `CachedFetcher`, and decodes the returned bodies into typed records.

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::models::{LocationArea, LocationAreaPage, Pokemon};
use super::HttpRetriever;
use crate::cache::{CachedFetcher, ExpiringCache, FetchError, Retrieve};

/// Base URL for the PokeAPI
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2/";

/// Errors that can occur when fetching API data
#[derive(Debug, Error)]
pub enum ApiError {
    /// The resource could not be retrieved
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the server reported that the resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Fetch(err) if err.is_not_found())
    }
}

/// Client for location areas and Pokemon, backed by an expiring cache
#[derive(Debug, Clone)]
pub struct PokeApiClient<R = HttpRetriever> {
    fetcher: CachedFetcher<R>,
    /// Base URL for the API, always ending in `/`
    base_url: String,
}

impl<R: Retrieve> PokeApiClient<R> {
    /// Create a client with a custom retriever and base URL
    pub fn with_retriever(cache: ExpiringCache, retriever: R, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            fetcher: CachedFetcher::new(cache, retriever),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Locator of the first location-area page
    pub fn location_area_root(&self) -> String {
        format!("{}location-area/", self.base_url)
    }

    /// Fetch one page of location areas
    ///
    /// # Arguments
    /// * `page` - A `next`/`previous` locator from an earlier page, or `None`
    ///   for the first page
    pub async fn location_areas(&self, page: Option<&str>) -> Result<LocationAreaPage, ApiError> {
        match page {
            Some(locator) => self.fetch_json(locator).await,
            None => self.fetch_json(&self.location_area_root()).await,
        }
    }

    /// Fetch a single location area by name or id
    pub async fn location_area(&self, name: &str) -> Result<LocationArea, ApiError> {
        let locator = format!("{}{}", self.location_area_root(), name);
        self.fetch_json(&locator).await
    }

    /// Fetch a single Pokemon by name or id
    pub async fn pokemon(&self, name: &str) -> Result<Pokemon, ApiError> {
        let locator = format!("{}pokemon/{}", self.base_url, name);
        self.fetch_json(&locator).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, locator: &str) -> Result<T, ApiError> {
        let body = self.fetcher.resolve(locator).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
