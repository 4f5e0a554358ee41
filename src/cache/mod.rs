//! Cache module for memoizing API responses in memory
//!
//! This module provides an `ExpiringCache` whose entries are purged by a
//! background sweeper once they outlive the configured TTL, and a
//! `CachedFetcher` that consults the cache before retrieving a resource from
//! the network. Nothing is persisted; the cache lives as long as the process.

mod expiring;
mod fetcher;

pub use expiring::{ExpiringCache, SweeperHandle};
pub use fetcher::{CachedFetcher, FetchError, Retrieve};
