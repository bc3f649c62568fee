//! Scheduling API access
//!
//! This module provides:
//! - The `ResourceApi` trait the matcher and reconciler are written against
//! - A reqwest-backed implementation with cursor pagination
//! - OAuth2 client-credentials token acquisition with caching

mod auth;
mod client;
mod error;

pub use auth::{AuthConfig, TokenProvider};
pub use client::HttpResourceApi;
pub use error::ApiError;

use crate::models::{Resource, Unavailability};
use anyhow::Result;
use chrono::{DateTime, Utc};

pub use async_trait::async_trait;

/// Operations the sync core needs from one scheduling API instance
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Fetch every resource in the system
    async fn list_resources(&self) -> Result<Vec<Resource>>;

    /// Fetch a resource's unavailabilities starting at or after `window_start`
    async fn list_unavailabilities(
        &self,
        resource_id: &str,
        window_start: DateTime<Utc>,
    ) -> Result<Vec<Unavailability>>;

    /// Create an unavailability, returning it with the server-assigned id
    async fn create_unavailability(&self, record: &Unavailability) -> Result<Unavailability>;

    /// Update an existing unavailability; `record.id` must be set
    async fn update_unavailability(&self, record: &Unavailability) -> Result<Unavailability>;

    /// Delete an unavailability by resource and record id
    async fn delete_unavailability(&self, resource_id: &str, id: &str) -> Result<()>;
}
