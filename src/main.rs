//! StartUpLens CLI entry point
//!
//! Resolves store settings (secrets file, then environment), constructs the
//! connection manager once, and dispatches the subcommand. A missing
//! connection string aborts here with operator guidance before any store
//! access; everything later degrades to typed failures rendered by the
//! subcommand handlers.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use startuplens::cli::{self, Cli};
use startuplens_core::error::LensError;
use startuplens_core::StoreSettings;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let settings = StoreSettings::resolve();
    if settings.uri.is_none() {
        eprintln!("Error: {}", LensError::missing_connection_string());
        std::process::exit(2);
    }

    if let Err(e) = cli::run(cli, settings).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
