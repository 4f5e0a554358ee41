//! Pokedex CLI - explore PokeAPI location areas from the terminal
//!
//! Reads commands from stdin, fetches location areas and Pokemon through an
//! in-memory response cache, and keeps a session Pokedex of caught Pokemon.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pokedex::api::{HttpRetriever, PokeApiClient};
use pokedex::cache::ExpiringCache;
use pokedex::cli::{Cli, StartupConfig};
use pokedex::repl::{CommandRegistry, Repl};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    // Logs go to stderr so they never interleave with REPL output
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    debug!(ttl = ?config.cache_ttl, base_url = %config.base_url, "starting pokedex");

    let (cache, sweeper) = ExpiringCache::new(config.cache_ttl);
    let client = PokeApiClient::with_retriever(cache, HttpRetriever::new(), config.base_url);
    let mut repl = Repl::new(CommandRegistry::standard(), client);

    let result = repl
        .run(BufReader::new(tokio::io::stdin()), &mut io::stdout())
        .await;

    sweeper.shutdown().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "terminal I/O failed");
            ExitCode::FAILURE
        }
    }
}
