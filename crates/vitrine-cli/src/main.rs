//! vitrine - CLI for a paginated content directory over an object store.
//!
//! A thin wrapper over the `vitrine` library: browse pages, read records,
//! count views, seed content, and serve the directory API.

mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    commands::handle(cli.command, &cli.global).await
}

/// Default filter directive for a `-v` count. `RUST_LOG` overrides it.
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info,tower_http=warn",
        2 => "debug,hyper=info,reqwest=info",
        _ => "trace",
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    // Logs go to stderr so stdout stays parseable.
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
