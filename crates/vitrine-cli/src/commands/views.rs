//! View counter commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use vitrine::RecordKey;

use crate::cli::GlobalArgs;
use crate::config::Workspace;
use crate::output;

#[derive(Args, Debug)]
pub struct ViewsCommand {
    #[command(subcommand)]
    pub command: ViewsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ViewsSubcommand {
    /// Count one view of a record and print the new count
    Increment {
        /// Domain name
        domain: String,
        /// Record key
        key: String,
    },

    /// Show the view counts of records
    Show {
        /// Domain name
        domain: String,
        /// Record keys
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

pub async fn handle(cmd: ViewsCommand, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let directory = workspace.directory();

    match cmd.command {
        ViewsSubcommand::Increment { domain, key } => {
            let domain = workspace.domain(&domain)?;
            let count = directory
                .counters()
                .increment(&domain, &key)
                .await
                .context("Failed to count view")?;
            println!("{}", count);
        }
        ViewsSubcommand::Show { domain, keys } => {
            let domain = workspace.domain(&domain)?;
            let keys = keys
                .iter()
                .map(|k| domain.validate_key(k))
                .collect::<Result<Vec<RecordKey>, _>>()
                .context("Invalid record key")?;

            let counts = directory.counters().read_many(&domain, &keys).await;
            for key in &keys {
                match counts.get(key) {
                    Some(count) => output::field(key.as_str(), &count.to_string()),
                    None => output::field(key.as_str(), &"no counter".dimmed().to_string()),
                }
            }
        }
    }

    Ok(())
}
