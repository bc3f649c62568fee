//! Master-to-local unavailability synchronization
//!
//! This module provides:
//! - Per-resource diffing and mutation planning
//! - Whole-run orchestration with per-resource failure isolation
//! - Run statistics

mod orchestrator;
mod reconciler;
mod stats;

#[cfg(test)]
mod tests;

pub use orchestrator::SyncOrchestrator;
pub use reconciler::{Reconciler, ResourcePlan};
pub use stats::{ResourceStats, SyncStats};
