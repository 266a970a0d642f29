//! Put command implementation.

use std::io::{self, Read};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;
use uuid::Uuid;

use vitrine::{Domain, ObjectStore, PutOptions};

use crate::cli::GlobalArgs;
use crate::config::Workspace;
use crate::output;

#[derive(Args, Debug)]
pub struct PutArgs {
    /// Domain name
    pub domain: String,

    /// JSON file with the record (use - for stdin)
    pub file: String,

    /// Record key (generated when omitted)
    #[arg(long)]
    pub key: Option<String>,

    /// Replace an existing record at the key
    #[arg(long)]
    pub overwrite: bool,
}

/// A fresh key: `<prefix><epoch millis>-<8 hex chars><suffix>`.
fn generate_key(domain: &Domain) -> String {
    let records = domain.records();
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}-{}{}",
        records.prefix(),
        chrono::Utc::now().timestamp_millis(),
        &id[..8],
        records.suffix()
    )
}

pub async fn run(args: PutArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let domain = workspace.domain(&args.domain)?;

    let content = if args.file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&args.file).context("Failed to read JSON file")?
    };

    let value: Value = serde_json::from_str(&content).context("Invalid JSON")?;
    if !value.is_object() {
        bail!("A record must be a JSON object");
    }

    let raw_key = args.key.unwrap_or_else(|| generate_key(&domain));
    let key = domain.validate_key(&raw_key).context("Invalid record key")?;

    let options = if args.overwrite {
        PutOptions::json_overwrite()
    } else {
        PutOptions::json_create()
    };

    workspace
        .store
        .put(key.as_str(), &value.to_string(), options)
        .await
        .context("Failed to store record")?;

    println!("{}", key);
    output::success(&format!("Stored record: {}", key));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_valid() {
        let domain = Domain::gallery();
        let key = generate_key(&domain);
        assert!(domain.validate_key(&key).is_ok(), "{key}");
        assert!(leading_millis(&key).is_some());
    }

    fn leading_millis(key: &str) -> Option<i64> {
        let name = key.strip_prefix("gallery/")?;
        name.split('-').next()?.parse().ok()
    }
}
