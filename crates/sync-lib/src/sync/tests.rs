//! Integration tests for the sync module
//!
//! These tests drive the reconciler and orchestrator against an in-memory
//! API double standing in for both scheduling systems.

use super::*;
use crate::api::{async_trait, ResourceApi};
use crate::models::{CustomFields, Resource, Unavailability};
use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory stand-in for one scheduling API instance
#[derive(Default)]
struct FakeApi {
    resources: Mutex<Vec<Resource>>,
    unavailabilities: Mutex<Vec<Unavailability>>,
    /// Resource ids whose unavailability listing fails
    failing_resources: Mutex<HashSet<String>>,
    /// When set, `list_resources` fails (match-phase failure)
    fail_listing: AtomicBool,
    next_id: AtomicU64,
    mutations: AtomicU64,
}

impl FakeApi {
    fn new(resources: Vec<Resource>) -> Arc<Self> {
        let api = Arc::new(Self::default());
        *api.resources.lock().unwrap() = resources;
        api
    }

    fn insert(&self, record: Unavailability) {
        self.unavailabilities.lock().unwrap().push(record);
    }

    fn fail_resource(&self, resource_id: &str) {
        self.failing_resources
            .lock()
            .unwrap()
            .insert(resource_id.to_string());
    }

    fn records_for(&self, resource_id: &str) -> Vec<Unavailability> {
        self.unavailabilities
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.resource_id == resource_id)
            .cloned()
            .collect()
    }

    fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceApi for FakeApi {
    async fn list_resources(&self) -> Result<Vec<Resource>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            bail!("simulated resource listing failure");
        }
        Ok(self.resources.lock().unwrap().clone())
    }

    async fn list_unavailabilities(
        &self,
        resource_id: &str,
        _window_start: DateTime<Utc>,
    ) -> Result<Vec<Unavailability>> {
        if self.failing_resources.lock().unwrap().contains(resource_id) {
            bail!("simulated transport failure for {resource_id}");
        }
        Ok(self.records_for(resource_id))
    }

    async fn create_unavailability(&self, record: &Unavailability) -> Result<Unavailability> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;

        let mut created = record.clone();
        created.id = Some(format!("assigned-{id}"));
        self.insert(created.clone());
        Ok(created)
    }

    async fn update_unavailability(&self, record: &Unavailability) -> Result<Unavailability> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let id = record
            .id
            .clone()
            .ok_or_else(|| anyhow!("cannot update unavailability without an id"))?;

        let mut store = self.unavailabilities.lock().unwrap();
        let entry = store
            .iter_mut()
            .find(|existing| existing.id.as_deref() == Some(id.as_str()))
            .ok_or_else(|| anyhow!("no record with id {id}"))?;
        *entry = record.clone();
        Ok(record.clone())
    }

    async fn delete_unavailability(&self, resource_id: &str, id: &str) -> Result<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.unavailabilities.lock().unwrap().retain(|record| {
            !(record.resource_id == resource_id && record.id.as_deref() == Some(id))
        });
        Ok(())
    }
}

fn window() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn resource(id: &str, name: &str) -> Resource {
    Resource {
        id: id.to_string(),
        name: name.to_string(),
        ..Default::default()
    }
}

fn resource_with_employeenumber(id: &str, number: &str) -> Resource {
    Resource {
        id: id.to_string(),
        name: format!("resource {id}"),
        custom_fields: CustomFields {
            employeenumber: Some(number.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A record as read from the master system: its own id, no external link
fn master_record(id: &str, resource_id: &str, start: &str, end: &str, reason: &str) -> Unavailability {
    Unavailability {
        id: Some(id.to_string()),
        resource_id: resource_id.to_string(),
        external_id: None,
        start_time: start.to_string(),
        end_time: end.to_string(),
        reason: reason.to_string(),
        description: String::new(),
    }
}

/// A record as read from the local system: linked to master via external_id
fn local_record(
    id: &str,
    resource_id: &str,
    external_id: &str,
    start: &str,
    end: &str,
    reason: &str,
) -> Unavailability {
    Unavailability {
        id: Some(id.to_string()),
        resource_id: resource_id.to_string(),
        external_id: Some(external_id.to_string()),
        start_time: start.to_string(),
        end_time: end.to_string(),
        reason: reason.to_string(),
        description: String::new(),
    }
}

mod reconciler_tests {
    use super::*;

    fn reconciler(local: &Arc<FakeApi>, master: &Arc<FakeApi>) -> Reconciler {
        Reconciler::new(local.clone(), master.clone(), window())
    }

    #[tokio::test]
    async fn test_equal_sets_are_unchanged() {
        let local = FakeApi::new(vec![]);
        let master = FakeApi::new(vec![]);

        master.insert(master_record("m1", "M", "2025-02-01", "2025-02-02", "PTO"));
        local.insert(local_record("l1", "L", "m1", "2025-02-01", "2025-02-02", "PTO"));

        let stats = reconciler(&local, &master)
            .reconcile_resource("L", "M")
            .await
            .unwrap();

        assert_eq!(
            stats,
            ResourceStats {
                created: 0,
                updated: 0,
                deleted: 0,
                unchanged: 1
            }
        );
        assert_eq!(local.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_master_only_record_is_mirrored() {
        let local = FakeApi::new(vec![]);
        let master = FakeApi::new(vec![]);

        master.insert(master_record("u1", "M", "2025-02-01", "2025-02-02", "PTO"));

        let stats = reconciler(&local, &master)
            .reconcile_resource("L", "M")
            .await
            .unwrap();

        assert_eq!(stats.created, 1);
        assert_eq!(stats.deleted, 0);
        assert_eq!(stats.unchanged, 0);

        let created = local.records_for("L");
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].external_id.as_deref(), Some("u1"));
        assert_eq!(created[0].resource_id, "L");
        assert!(created[0].id.is_some());
        assert_eq!(created[0].start_time, "2025-02-01");
        assert_eq!(created[0].end_time, "2025-02-02");
    }

    #[tokio::test]
    async fn test_local_only_record_is_deleted() {
        let local = FakeApi::new(vec![]);
        let master = FakeApi::new(vec![]);

        local.insert(local_record("l1", "L", "gone", "2025-02-01", "2025-02-02", "PTO"));

        let stats = reconciler(&local, &master)
            .reconcile_resource("L", "M")
            .await
            .unwrap();

        assert_eq!(stats.deleted, 1);
        assert_eq!(stats.created, 0);
        assert!(local.records_for("L").is_empty());
    }

    #[tokio::test]
    async fn test_record_without_assigned_id_is_not_deleted() {
        let local = FakeApi::new(vec![]);
        let master = FakeApi::new(vec![]);

        let mut record = local_record("x", "L", "gone", "2025-02-01", "2025-02-02", "PTO");
        record.id = None;
        local.insert(record);

        let stats = reconciler(&local, &master)
            .reconcile_resource("L", "M")
            .await
            .unwrap();

        assert_eq!(stats.deleted, 0);
        assert_eq!(local.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_reason_change_produces_one_update() {
        let local = FakeApi::new(vec![]);
        let master = FakeApi::new(vec![]);

        master.insert(master_record("m1", "M", "2025-02-01", "2025-02-02", "Sick"));
        local.insert(local_record("l1", "L", "m1", "2025-02-01", "2025-02-02", "PTO"));

        let stats = reconciler(&local, &master)
            .reconcile_resource("L", "M")
            .await
            .unwrap();

        assert_eq!(
            stats,
            ResourceStats {
                created: 0,
                updated: 1,
                deleted: 0,
                unchanged: 0
            }
        );

        let updated = local.records_for("L");
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].id.as_deref(), Some("l1"));
        assert_eq!(updated[0].external_id.as_deref(), Some("m1"));
        assert_eq!(updated[0].reason, "Sick");
    }

    #[tokio::test]
    async fn test_update_overwrites_times_with_master_values() {
        let local = FakeApi::new(vec![]);
        let master = FakeApi::new(vec![]);

        master.insert(master_record("m1", "M", "2025-03-01", "2025-03-05", "PTO"));
        local.insert(local_record("l1", "L", "m1", "2025-02-01", "2025-02-02", "PTO"));

        let stats = reconciler(&local, &master)
            .reconcile_resource("L", "M")
            .await
            .unwrap();

        assert_eq!(stats.updated, 1);

        let updated = local.records_for("L");
        assert_eq!(updated[0].start_time, "2025-03-01");
        assert_eq!(updated[0].end_time, "2025-03-05");
        assert_eq!(updated[0].id.as_deref(), Some("l1"));
    }

    #[tokio::test]
    async fn test_plan_reports_counts_without_mutating() {
        let local = FakeApi::new(vec![]);
        let master = FakeApi::new(vec![]);

        master.insert(master_record("m1", "M", "2025-02-01", "2025-02-02", "PTO"));

        let plan = reconciler(&local, &master)
            .plan_resource("L", "M")
            .await
            .unwrap();

        assert_eq!(plan.stats().created, 1);
        assert!(!plan.is_noop());
        assert_eq!(local.mutation_count(), 0);
        assert!(local.records_for("L").is_empty());
    }
}

mod orchestrator_tests {
    use super::*;

    fn orchestrator(local: &Arc<FakeApi>, master: &Arc<FakeApi>) -> SyncOrchestrator {
        SyncOrchestrator::new(local.clone(), master.clone(), window())
    }

    #[tokio::test]
    async fn test_example_scenario_end_to_end() {
        let local = FakeApi::new(vec![resource_with_employeenumber("local-1", "42")]);
        let master = FakeApi::new(vec![
            resource_with_employeenumber("A", "42"),
            resource("B", "X"),
        ]);

        master.insert(master_record("u1", "A", "2025-02-01", "2025-02-02", "PTO"));

        let stats = orchestrator(&local, &master).run().await.unwrap();

        assert_eq!(stats.created, 1);
        assert_eq!(stats.errors, 0);

        let mirrored = local.records_for("local-1");
        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored[0].external_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_second_run_is_all_unchanged() {
        let local = FakeApi::new(vec![resource("l1", "Shared Name")]);
        let master = FakeApi::new(vec![resource("m1", "Shared Name")]);

        master.insert(master_record("u1", "m1", "2025-02-01", "2025-02-02", "PTO"));

        let orchestrator = orchestrator(&local, &master);

        let first = orchestrator.run().await.unwrap();
        assert_eq!(first.created, 1);

        let second = orchestrator.run().await.unwrap();
        assert_eq!(
            second,
            SyncStats {
                created: 0,
                updated: 0,
                deleted: 0,
                unchanged: 1,
                errors: 0
            }
        );
    }

    #[tokio::test]
    async fn test_resource_failure_does_not_abort_run() {
        let local = FakeApi::new(vec![resource("l1", "Alpha"), resource("l2", "Beta")]);
        let master = FakeApi::new(vec![resource("m1", "Alpha"), resource("m2", "Beta")]);

        master.insert(master_record("u1", "m1", "2025-02-01", "2025-02-02", "PTO"));
        master.insert(master_record("u2", "m2", "2025-03-01", "2025-03-02", "PTO"));
        local.fail_resource("l2");

        let stats = orchestrator(&local, &master).run().await.unwrap();

        assert_eq!(stats.errors, 1);
        assert_eq!(stats.created, 1);
        assert_eq!(local.records_for("l1").len(), 1);
        assert!(local.records_for("l2").is_empty());
    }

    #[tokio::test]
    async fn test_match_phase_failure_is_fatal() {
        let local = FakeApi::new(vec![resource("l1", "Alpha")]);
        let master = FakeApi::new(vec![resource("m1", "Alpha")]);

        local.fail_listing.store(true, Ordering::SeqCst);

        let result = orchestrator(&local, &master).run().await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_preview_counts_without_mutating() {
        let local = FakeApi::new(vec![resource("l1", "Alpha")]);
        let master = FakeApi::new(vec![resource("m1", "Alpha")]);

        master.insert(master_record("u1", "m1", "2025-02-01", "2025-02-02", "PTO"));

        let orchestrator = orchestrator(&local, &master);

        let preview = orchestrator.preview().await.unwrap();
        assert_eq!(preview.created, 1);
        assert_eq!(local.mutation_count(), 0);
        assert!(local.records_for("l1").is_empty());

        // The real run performs what the preview promised
        let run = orchestrator.run().await.unwrap();
        assert_eq!(run.created, 1);
        assert_eq!(local.records_for("l1").len(), 1);
    }

    #[tokio::test]
    async fn test_unmatched_resources_are_skipped() {
        let local = FakeApi::new(vec![resource("l1", "Nobody")]);
        let master = FakeApi::new(vec![resource("m1", "Somebody")]);

        master.insert(master_record("u1", "m1", "2025-02-01", "2025-02-02", "PTO"));

        let stats = orchestrator(&local, &master).run().await.unwrap();

        assert_eq!(stats, SyncStats::default());
        assert!(local.records_for("l1").is_empty());
    }
}
