//! Whole-run orchestration
//!
//! Runs the match phase once, then walks every matched resource pair
//! through the reconciler. The match phase is fail-fast; a single pair's
//! failure only increments the error count and never aborts the run.

use crate::api::ResourceApi;
use crate::matcher::ResourceMatcher;
use crate::sync::reconciler::Reconciler;
use crate::sync::stats::SyncStats;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

/// Drives a full master-to-local synchronization pass
pub struct SyncOrchestrator {
    local: Arc<dyn ResourceApi>,
    master: Arc<dyn ResourceApi>,
    reconciler: Reconciler,
}

impl SyncOrchestrator {
    pub fn new(
        local: Arc<dyn ResourceApi>,
        master: Arc<dyn ResourceApi>,
        window_start: DateTime<Utc>,
    ) -> Self {
        let reconciler = Reconciler::new(local.clone(), master.clone(), window_start);
        Self {
            local,
            master,
            reconciler,
        }
    }

    /// Fetch both resource sets and compute the local -> master id map
    ///
    /// Any failure here aborts the whole run; there is no per-resource
    /// fallback for a failed match phase.
    pub async fn match_resources(&self) -> Result<BTreeMap<String, String>> {
        let local_resources = self
            .local
            .list_resources()
            .await
            .context("Failed to list local resources")?;
        let master_resources = self
            .master
            .list_resources()
            .await
            .context("Failed to list master resources")?;

        let matcher = ResourceMatcher::new(master_resources);
        Ok(matcher.match_all(&local_resources))
    }

    /// Run a full synchronization pass, applying mutations to local
    pub async fn run(&self) -> Result<SyncStats> {
        let matches = self.match_resources().await?;
        let mut totals = SyncStats::default();

        for (local_id, master_id) in &matches {
            match self.reconciler.reconcile_resource(local_id, master_id).await {
                Ok(stats) => totals.absorb(stats),
                Err(e) => {
                    error!(
                        resource_id = %local_id,
                        error = %e,
                        "Failed to sync unavailabilities for resource"
                    );
                    totals.errors += 1;
                }
            }
        }

        info!(%totals, "Sync complete");
        Ok(totals)
    }

    /// Compute what a run would do without mutating the local system
    pub async fn preview(&self) -> Result<SyncStats> {
        let matches = self.match_resources().await?;
        let mut totals = SyncStats::default();

        for (local_id, master_id) in &matches {
            match self.reconciler.plan_resource(local_id, master_id).await {
                Ok(plan) => totals.absorb(plan.stats()),
                Err(e) => {
                    error!(
                        resource_id = %local_id,
                        error = %e,
                        "Failed to plan sync for resource"
                    );
                    totals.errors += 1;
                }
            }
        }

        info!(%totals, "Dry run complete");
        Ok(totals)
    }
}
