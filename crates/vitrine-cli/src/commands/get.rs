//! Get command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::GlobalArgs;
use crate::config::Workspace;
use crate::output;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Domain name
    pub domain: String,

    /// Record key (e.g., notices/1715000000000-ab12cd34.json)
    pub key: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: GetArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let domain = workspace.domain(&args.domain)?;

    let row = workspace
        .directory()
        .get_record(&domain, &args.key)
        .await
        .context("Failed to get record")?;

    output::json_as(&row, args.pretty)
}
