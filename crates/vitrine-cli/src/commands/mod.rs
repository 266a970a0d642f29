//! Subcommand implementations.

pub mod get;
pub mod list;
pub mod put;
pub mod serve;
pub mod views;

use anyhow::Result;

use crate::cli::{Commands, GlobalArgs};

pub async fn handle(cmd: Commands, global: &GlobalArgs) -> Result<()> {
    match cmd {
        Commands::List(args) => list::run(args, global).await,
        Commands::Get(args) => get::run(args, global).await,
        Commands::Views(cmd) => views::handle(cmd, global).await,
        Commands::Put(args) => put::run(args, global).await,
        Commands::Serve(args) => serve::run(args, global).await,
    }
}
