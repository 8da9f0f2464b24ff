//! `dealsync sync` — run one synchronization for a deal snapshot.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use dealsync_client::HttpBrokerageApi;
use dealsync_core::{config, FileMappingStore};
use dealsync_engine::{
    DealPath, FormSelections, PersonStatus, StatusSink, SyncOrchestrator, SyncReport, SyncRequest,
};

use super::read_deal;

/// Arguments for `dealsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to the deal snapshot (JSON).
    pub deal: PathBuf,

    /// Email of the agent running the sync; must appear on the deal.
    #[arg(long)]
    pub user: String,

    #[arg(long)]
    pub deal_type: Option<String>,

    #[arg(long)]
    pub deal_sub_type: Option<String>,

    #[arg(long)]
    pub lead_source: Option<String>,

    #[arg(long)]
    pub property_type: Option<String>,

    #[arg(long)]
    pub sale_status: Option<String>,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        self.run_at(&home)
    }

    fn run_at(self, home: &Path) -> Result<()> {
        let deal = read_deal(&self.deal)?;
        let config = config::load_at(home).context("failed to load dealsync configuration")?;

        let request = SyncRequest {
            deal,
            user_email: self.user,
            selections: FormSelections {
                deal_type: self.deal_type,
                deal_sub_type: self.deal_sub_type,
                lead_source: self.lead_source,
                property_type: self.property_type,
                sale_status: self.sale_status,
            },
            credentials: config.credentials.clone(),
            session: None,
        };

        let api = HttpBrokerageApi::from_config(&config);
        let store = FileMappingStore::at(home);
        let mut orchestrator = SyncOrchestrator::new(api, store);
        let report = orchestrator
            .run(&request, &mut ConsoleStatus)
            .with_context(|| format!("sync failed for deal '{}'", request.deal.id))?;

        print_report(&report);
        Ok(())
    }
}

/// Prints status strings as the run advances.
struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn emit(&mut self, status: &str) {
        if status.ends_with("...") {
            println!("{} {status}", "→".bright_black());
        } else {
            println!("{}", status.bold());
        }
    }
}

#[derive(Tabled)]
struct PersonRow {
    #[tabled(rename = "participant")]
    name: String,
    #[tabled(rename = "email")]
    email: String,
    #[tabled(rename = "role")]
    category: String,
    #[tabled(rename = "side")]
    side: String,
    #[tabled(rename = "result")]
    result: String,
}

fn print_report(report: &SyncReport) {
    let verb = match report.path {
        DealPath::Created => "created",
        DealPath::Updated => "updated",
    };
    println!(
        "Remote deal {} {verb} in brokerage {}",
        report.remote_deal_id.as_str().bold(),
        report.brokerage
    );

    if !report.people.is_empty() {
        let rows: Vec<PersonRow> = report
            .people
            .iter()
            .map(|p| PersonRow {
                name: p.name.clone(),
                email: p.email.clone(),
                category: p.category.to_string(),
                side: p.side.to_string(),
                result: match &p.status {
                    PersonStatus::Granted { .. } => "granted".green().to_string(),
                    PersonStatus::ProfileUnresolved => "no profile".red().to_string(),
                    PersonStatus::AccessFailed { .. } => "grant failed".red().to_string(),
                },
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    for warning in &report.warnings {
        println!("{} {warning}", "warning:".yellow().bold());
    }
}
