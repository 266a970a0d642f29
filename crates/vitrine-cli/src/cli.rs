//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{get, list, put, serve, views};

/// Browse, count, and serve a content directory kept in an object store.
#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(author, version = env!("VITRINE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the store is and how to tune the directory.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Object store URL (https://..., http://localhost:..., or file:///path)
    #[arg(long, env = "VITRINE_STORE", global = true)]
    pub store: Option<String>,

    /// Bearer token for the object store
    #[arg(long, env = "VITRINE_STORE_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Configuration file (defaults to config.json in the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List one page of a domain's records, newest first
    List(list::ListArgs),

    /// Fetch a single record with its view count
    Get(get::GetArgs),

    /// View counter operations
    Views(views::ViewsCommand),

    /// Store a JSON record in a domain
    Put(put::PutArgs),

    /// Serve the directory API over HTTP
    Serve(serve::ServeArgs),
}
