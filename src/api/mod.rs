//! PokeAPI access
//!
//! This module contains the HTTP retriever used on cache misses, the typed
//! records decoded from API responses, and the client that ties them to the
//! response cache.

mod client;
mod http;
pub mod models;

pub use client::{ApiError, PokeApiClient, DEFAULT_BASE_URL};
pub use http::HttpRetriever;
pub use models::{LocationArea, LocationAreaPage, NamedResource, Pokemon};
