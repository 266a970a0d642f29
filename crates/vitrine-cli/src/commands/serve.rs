//! Serve command implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use vitrine_server::{AppState, create_router};

use crate::cli::GlobalArgs;
use crate::config::Workspace;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub bind: String,
}

pub async fn run(args: ServeArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::open(global)?;

    let state = AppState::new(Arc::new(workspace.store.clone()), &workspace.config)
        .context("Invalid directory configuration")?;
    let app = create_router(state);

    let addr: SocketAddr = args.bind.parse().context("invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!(store = %workspace.store.url(), "Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}
