//! Command-line interface parsing for the Pokedex
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated `StartupConfig`: the response cache TTL, the API base URL, and
//! the log verbosity.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::api::DEFAULT_BASE_URL;

/// Default response cache TTL in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The cache TTL must be a positive number of seconds
    #[error("Invalid cache TTL: {0}. The TTL must be at least 1 second")]
    InvalidTtl(u64),

    /// The base URL is not an http(s) URL
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),
}

/// Pokedex - explore PokeAPI location areas and catch Pokemon
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Interactive PokeAPI explorer with an in-memory response cache")]
#[command(version)]
pub struct Cli {
    /// Seconds a cached API response is kept before it is swept
    #[arg(long, value_name = "SECONDS", env = "POKEDEX_CACHE_TTL", default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl: u64,

    /// Base URL of the API
    #[arg(long, value_name = "URL", env = "POKEDEX_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Log cache activity to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// How long cached responses live
    pub cache_ttl: Duration,
    /// Base URL of the API, always ending in `/`
    pub base_url: String,
    /// Whether debug logging is enabled
    pub verbose: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            base_url: DEFAULT_BASE_URL.to_string(),
            verbose: false,
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with a validated TTL and normalized base URL
    /// * `Err(CliError)` if the TTL is zero or the base URL is not http(s)
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.cache_ttl == 0 {
            return Err(CliError::InvalidTtl(cli.cache_ttl));
        }

        let base_url = cli.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CliError::InvalidBaseUrl(cli.base_url.clone()));
        }
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(StartupConfig {
            cache_ttl: Duration::from_secs(cli.cache_ttl),
            base_url,
            verbose: cli.verbose,
        })
    }

    /// Default tracing filter for this configuration
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "pokedex=debug"
        } else {
            "pokedex=warn"
        }
    }
}
