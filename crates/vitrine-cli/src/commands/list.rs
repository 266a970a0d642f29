//! List command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use vitrine::{PageQuery, SearchScope};

use crate::cli::GlobalArgs;
use crate::config::Workspace;
use crate::output;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Domain name (e.g., notices, gallery)
    pub domain: String,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Records per page (at most 50)
    #[arg(long, default_value_t = 10)]
    pub page_size: u32,

    /// Case-insensitive text to search for
    #[arg(long, short)]
    pub query: Option<String>,

    /// Fields to search: title, body, or both
    #[arg(long, default_value = "both")]
    pub scope: String,

    /// Only records in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub async fn run(args: ListArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let domain = workspace.domain(&args.domain)?;

    let mut query = PageQuery::new(args.page, args.page_size);
    if let Some(q) = args.query {
        let scope: SearchScope = args.scope.parse().context("Invalid search scope")?;
        query = query.with_search(q, scope);
    }
    if let Some(category) = args.category {
        query = query.with_category(category);
    }

    let page = workspace
        .directory()
        .list_page(&domain, &query)
        .await
        .context("Failed to list records")?;

    for row in &page.rows {
        output::json_as(row, args.pretty)?;
    }

    if page.rows.is_empty() {
        eprintln!("{}", "No records on this page.".dimmed());
    }

    let pages = page.total.div_ceil(page.page_size as usize).max(1);
    eprintln!(
        "{}",
        format!("Page {} of {} ({} records)", page.page, pages, page.total).dimmed()
    );
    if page.partial {
        output::warning("Some records could not be read and were skipped.");
    }

    Ok(())
}
