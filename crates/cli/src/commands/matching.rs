//! Resource match report

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use sync_lib::{ResourceApi, ResourceMatcher};
use tabled::Tabled;

use crate::config::Settings;
use crate::output::{color_match, print_warning, OutputFormat};

/// Row for the match report table
#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "Local ID")]
    local_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Master ID")]
    master_id: String,
}

/// JSON shape of the match report
#[derive(Serialize)]
struct MatchReport {
    matched: BTreeMap<String, String>,
    unmatched: Vec<String>,
}

/// Run the match phase only and report the outcome per local resource
pub async fn execute(settings: &Settings, format: OutputFormat) -> Result<()> {
    let local = settings.api_client(&settings.local)?;
    let master = settings.api_client(&settings.master)?;

    let mut local_resources = local
        .list_resources()
        .await
        .context("Failed to list local resources")?;
    let master_resources = master
        .list_resources()
        .await
        .context("Failed to list master resources")?;

    let matcher = ResourceMatcher::new(master_resources);
    let matches = matcher.match_all(&local_resources);

    local_resources.sort_by(|a, b| a.id.cmp(&b.id));

    match format {
        OutputFormat::Json => {
            let unmatched = local_resources
                .iter()
                .filter(|resource| !matches.contains_key(&resource.id))
                .map(|resource| resource.id.clone())
                .collect();
            let report = MatchReport { matched: matches, unmatched };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            if local_resources.is_empty() {
                print_warning("No local resources found");
                return Ok(());
            }

            let rows: Vec<MatchRow> = local_resources
                .iter()
                .map(|resource| MatchRow {
                    local_id: resource.id.clone(),
                    name: resource.name.clone(),
                    master_id: color_match(matches.get(&resource.id).map(String::as_str)),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!(
                "\nMatched {} of {} resources",
                matches.len(),
                local_resources.len()
            );
        }
    }

    Ok(())
}
