//! Full synchronization pass

use anyhow::Result;
use std::sync::Arc;
use sync_lib::{SyncOrchestrator, SyncStats};
use tabled::Tabled;

use crate::config::Settings;
use crate::output::{color_errors, print_success, print_warning, OutputFormat};

/// Row for the run summary table
#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Created")]
    created: u64,
    #[tabled(rename = "Updated")]
    updated: u64,
    #[tabled(rename = "Deleted")]
    deleted: u64,
    #[tabled(rename = "Unchanged")]
    unchanged: u64,
    #[tabled(rename = "Errors")]
    errors: String,
}

/// Run a synchronization pass, or plan one with `dry_run`
pub async fn execute(settings: &Settings, dry_run: bool, format: OutputFormat) -> Result<()> {
    let local = Arc::new(settings.api_client(&settings.local)?);
    let master = Arc::new(settings.api_client(&settings.master)?);
    let orchestrator = SyncOrchestrator::new(local, master, settings.window_start);

    let stats = if dry_run {
        orchestrator.preview().await?
    } else {
        orchestrator.run().await?
    };

    render(&stats, dry_run, format)?;
    Ok(())
}

fn render(stats: &SyncStats, dry_run: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(stats)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            let rows = vec![StatsRow {
                created: stats.created,
                updated: stats.updated,
                deleted: stats.deleted,
                unchanged: stats.unchanged,
                errors: color_errors(stats.errors),
            }];

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            if dry_run {
                print_warning("Dry-run mode - no changes applied");
            } else if stats.errors > 0 {
                print_warning(&format!(
                    "{} resource(s) failed to sync; see logs for details",
                    stats.errors
                ));
            } else {
                print_success("Sync complete");
            }
        }
    }

    Ok(())
}
