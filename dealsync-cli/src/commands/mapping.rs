//! `dealsync mapping list` and `dealsync mapping show <deal-id>`

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use dealsync_core::{DealId, FileMappingStore, Mapping, MappingStore};

/// Inspect the local-to-remote deal mapping store.
#[derive(Subcommand, Debug)]
pub enum MappingCommand {
    /// List every stored mapping, oldest first.
    List(ListArgs),

    /// Show the remote deal id mapped to a local deal id.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Local deal id.
    pub deal_id: String,
}

#[derive(Serialize)]
struct MappingJson<'a> {
    deal_id: &'a str,
    remote_deal_id: &'a str,
    created_at: String,
}

#[derive(Tabled)]
struct MappingRow {
    #[tabled(rename = "deal")]
    deal_id: String,
    #[tabled(rename = "remote deal")]
    remote_deal_id: String,
    #[tabled(rename = "created")]
    created_at: String,
    #[tabled(rename = "age")]
    age: String,
}

pub fn run(cmd: MappingCommand) -> Result<()> {
    let store = FileMappingStore::open().context("could not locate the mapping store")?;
    match cmd {
        MappingCommand::List(args) => list(&store, args.json),
        MappingCommand::Show(args) => show(&store, &args.deal_id),
    }
}

fn list(store: &FileMappingStore, json: bool) -> Result<()> {
    let mappings = store
        .list()
        .with_context(|| format!("failed to read {}", store.path().display()))?;

    if json {
        let payload: Vec<MappingJson<'_>> = mappings
            .iter()
            .map(|m| MappingJson {
                deal_id: m.deal_id.as_str(),
                remote_deal_id: m.remote_deal_id.as_str(),
                created_at: m.created_at.to_rfc3339(),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to serialize mappings")?
        );
        return Ok(());
    }

    if mappings.is_empty() {
        println!("No deals synced yet.");
        return Ok(());
    }

    let rows: Vec<MappingRow> = mappings.iter().map(row).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn show(store: &FileMappingStore, deal_id: &str) -> Result<()> {
    let found = store
        .lookup(&DealId::from(deal_id))
        .with_context(|| format!("failed to read {}", store.path().display()))?;
    let Some(mapping) = found else {
        bail!("deal '{deal_id}' has not been synced");
    };
    println!("{}", mapping.remote_deal_id);
    Ok(())
}

fn row(mapping: &Mapping) -> MappingRow {
    MappingRow {
        deal_id: mapping.deal_id.to_string(),
        remote_deal_id: mapping.remote_deal_id.to_string(),
        created_at: mapping.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        age: format_age(mapping.created_at, Utc::now()),
    }
}

fn format_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    if elapsed.num_days() > 0 {
        format!("{}d ago", elapsed.num_days())
    } else if elapsed.num_hours() > 0 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_minutes() > 0 {
        format!("{}m ago", elapsed.num_minutes())
    } else {
        "just now".to_string()
    }
}
