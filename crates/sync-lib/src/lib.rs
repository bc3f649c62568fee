//! Library for reconciling resource unavailability records between two
//! instances of the same scheduling API
//!
//! This crate provides the core functionality for:
//! - Heuristic matching of resources across systems with no shared key
//! - Diffing and syncing unavailability records from master into local
//! - Authenticated, paginated access to the scheduling API

pub mod api;
pub mod matcher;
pub mod models;
pub mod sync;

pub use api::{ApiError, AuthConfig, HttpResourceApi, ResourceApi, TokenProvider};
pub use matcher::ResourceMatcher;
pub use models::*;
pub use sync::{Reconciler, ResourcePlan, ResourceStats, SyncOrchestrator, SyncStats};
