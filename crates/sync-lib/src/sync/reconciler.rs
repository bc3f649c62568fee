//! Diffing one resource pair's unavailability sets
//!
//! For a matched (local, master) resource pair the reconciler fetches both
//! windowed unavailability sets, pairs records on the cross-system link
//! (`local.external_id == master.id`), and classifies the remainder into
//! creates, updates, and deletes. Plans are built as explicit values and
//! applied in a second step so a dry run can stop after planning.

use crate::api::ResourceApi;
use crate::models::Unavailability;
use crate::sync::stats::ResourceStats;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Mutations that converge one local resource onto master state
#[derive(Debug, Default)]
pub struct ResourcePlan {
    /// New local records mirroring master records with no local partner
    pub creates: Vec<Unavailability>,
    /// Replacement values for paired records whose payload drifted
    pub updates: Vec<Unavailability>,
    /// (resource id, record id) pairs no longer present in master
    pub deletes: Vec<(String, String)>,
    /// Paired records that already agree
    pub unchanged: u64,
}

impl ResourcePlan {
    /// Counts this plan would produce if applied cleanly
    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            created: self.creates.len() as u64,
            updated: self.updates.len() as u64,
            deleted: self.deletes.len() as u64,
            unchanged: self.unchanged,
        }
    }

    /// True when applying the plan would perform no mutations
    pub fn is_noop(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

/// Reconciles unavailability records from master into local, one resource
/// pair at a time
pub struct Reconciler {
    local: Arc<dyn ResourceApi>,
    master: Arc<dyn ResourceApi>,
    window_start: DateTime<Utc>,
}

impl Reconciler {
    pub fn new(
        local: Arc<dyn ResourceApi>,
        master: Arc<dyn ResourceApi>,
        window_start: DateTime<Utc>,
    ) -> Self {
        Self {
            local,
            master,
            window_start,
        }
    }

    /// Compute the plan for one matched resource pair without mutating
    pub async fn plan_resource(&self, local_id: &str, master_id: &str) -> Result<ResourcePlan> {
        let local_records = self
            .local
            .list_unavailabilities(local_id, self.window_start)
            .await?;
        let master_records = self
            .master
            .list_unavailabilities(master_id, self.window_start)
            .await?;

        Ok(build_plan(local_id, local_records, master_records))
    }

    /// Apply a computed plan against the local system
    ///
    /// The first failing mutation aborts the rest of the plan; no partial
    /// counts survive because the error discards the stats entirely.
    pub async fn apply_plan(&self, plan: ResourcePlan) -> Result<ResourceStats> {
        let mut stats = ResourceStats::default();

        for record in &plan.creates {
            let created = self.local.create_unavailability(record).await?;
            stats.created += 1;
            debug!(
                resource_id = %record.resource_id,
                id = ?created.id,
                start_time = %record.start_time,
                end_time = %record.end_time,
                "Created unavailability"
            );
        }

        for record in &plan.updates {
            self.local.update_unavailability(record).await?;
            stats.updated += 1;
            debug!(resource_id = %record.resource_id, id = ?record.id, "Updated unavailability");
        }

        for (resource_id, id) in &plan.deletes {
            self.local.delete_unavailability(resource_id, id).await?;
            stats.deleted += 1;
            debug!(resource_id = %resource_id, id = %id, "Deleted unavailability");
        }

        stats.unchanged = plan.unchanged;
        Ok(stats)
    }

    /// Plan and apply for one matched resource pair
    pub async fn reconcile_resource(
        &self,
        local_id: &str,
        master_id: &str,
    ) -> Result<ResourceStats> {
        let plan = self.plan_resource(local_id, master_id).await?;
        self.apply_plan(plan).await
    }
}

/// Pair records across systems and classify the differences
///
/// Both sets are sorted by id before the greedy scan so the pairing is
/// reproducible for a given pair of record sets. Each record participates
/// in at most one pair.
fn build_plan(
    local_resource_id: &str,
    mut local_records: Vec<Unavailability>,
    mut master_records: Vec<Unavailability>,
) -> ResourcePlan {
    local_records.sort_by(|a, b| a.id.cmp(&b.id));
    master_records.sort_by(|a, b| a.id.cmp(&b.id));

    let mut plan = ResourcePlan::default();
    let mut unmatched_local = local_records;

    for master in master_records {
        let partner = master.id.as_deref().and_then(|master_id| {
            unmatched_local
                .iter()
                .position(|local| local.external_id.as_deref() == Some(master_id))
        });

        match partner {
            Some(index) => {
                let local = unmatched_local.remove(index);
                if needs_update(&local, &master) {
                    plan.updates.push(update_value(&local, &master));
                } else {
                    plan.unchanged += 1;
                }
            }
            None => plan.creates.push(mirror_value(local_resource_id, &master)),
        }
    }

    for local in unmatched_local {
        // Records never persisted locally have nothing to delete
        if let Some(id) = local.id {
            plan.deletes.push((local.resource_id.clone(), id));
        }
    }

    plan
}

/// A pair needs an update when any payload field drifted
///
/// Identity alignment (`local.external_id == master.id`) is guaranteed by
/// the pairing, so only the payload fields are compared.
fn needs_update(local: &Unavailability, master: &Unavailability) -> bool {
    local.start_time != master.start_time
        || local.end_time != master.end_time
        || local.reason != master.reason
        || local.description != master.description
}

/// Build the update request: local identity, master payload
fn update_value(local: &Unavailability, master: &Unavailability) -> Unavailability {
    Unavailability {
        id: local.id.clone(),
        resource_id: local.resource_id.clone(),
        external_id: local.external_id.clone(),
        start_time: master.start_time.clone(),
        end_time: master.end_time.clone(),
        reason: master.reason.clone(),
        description: master.description.clone(),
    }
}

/// Build the local mirror of a master record that has no local partner
fn mirror_value(local_resource_id: &str, master: &Unavailability) -> Unavailability {
    Unavailability {
        id: None,
        resource_id: local_resource_id.to_string(),
        external_id: master.id.clone(),
        start_time: master.start_time.clone(),
        end_time: master.end_time.clone(),
        reason: master.reason.clone(),
        description: master.description.clone(),
    }
}
