//! `dealsync classify` — offline preview of participant classification.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use dealsync_engine::{classify, decide_owning_side};

use super::read_deal;

/// Arguments for `dealsync classify`.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Path to the deal snapshot (JSON).
    pub deal: PathBuf,
}

#[derive(Tabled)]
struct RoleRow {
    #[tabled(rename = "participant")]
    name: String,
    #[tabled(rename = "email")]
    email: String,
    #[tabled(rename = "tag")]
    tag: String,
    #[tabled(rename = "role")]
    category: String,
    #[tabled(rename = "side")]
    side: String,
}

impl ClassifyArgs {
    pub fn run(self) -> Result<()> {
        let deal = read_deal(&self.deal)?;

        println!(
            "Deal {} | {:?} | owning side: {}",
            deal.id.as_str().bold(),
            deal.direction,
            decide_owning_side(&deal).to_string().bold()
        );

        let rows: Vec<RoleRow> = deal
            .roles
            .iter()
            .map(|role| {
                let email = role.sync_email().map(str::to_owned);
                let classification = classify(&deal, &role.role);
                RoleRow {
                    name: role.legal_name(),
                    email: email.unwrap_or_else(|| "(not synced)".bright_black().to_string()),
                    tag: role.role.to_string(),
                    category: classification.category.to_string(),
                    side: classification.side.to_string(),
                }
            })
            .collect();

        if rows.is_empty() {
            println!("No participants on this deal.");
            return Ok(());
        }

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
