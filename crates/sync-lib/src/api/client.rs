//! HTTP client for the scheduling API
//!
//! Wraps reqwest with bearer-token auth and cursor pagination. Listing
//! calls walk every page internally and return the full result set.

use crate::api::{async_trait, ApiError, AuthConfig, ResourceApi, TokenProvider};
use crate::models::{Page, Resource, Unavailability};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

/// Client for one scheduling API instance
pub struct HttpResourceApi {
    client: Client,
    base_url: Url,
    tokens: TokenProvider,
}

/// Mutation payload; record identity travels in the URL
#[derive(Serialize)]
struct UnavailabilityPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    external_id: Option<&'a str>,
    start_time: &'a str,
    end_time: &'a str,
    reason: &'a str,
    description: &'a str,
}

impl<'a> From<&'a Unavailability> for UnavailabilityPayload<'a> {
    fn from(record: &'a Unavailability) -> Self {
        Self {
            external_id: record.external_id.as_deref(),
            start_time: &record.start_time,
            end_time: &record.end_time,
            reason: &record.reason,
            description: &record.description,
        }
    }
}

impl HttpResourceApi {
    /// Create a client for the given base URL and credentials
    pub fn new(base_url: &str, auth: AuthConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        // A trailing slash keeps Url::join from eating the last path segment
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).context("Invalid API URL")?;

        let tokens = TokenProvider::new(auth, client.clone());

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("Invalid path")
    }

    /// Fetch every item from a cursor-paginated endpoint
    async fn paginated_get<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let token = self.tokens.token().await?;
            let mut request = self.client.get(url.clone()).bearer_auth(&token);
            for (key, value) in params {
                request = request.query(&[(*key, value.as_str())]);
            }
            if let Some(ref c) = cursor {
                request = request.query(&[("cursor", c.as_str())]);
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::Status { status, body });
            }

            let page: Page<T> = response.json().await?;
            items.extend(page.items);
            cursor = page.next_cursor;

            if cursor.is_none() {
                break;
            }
        }

        Ok(items)
    }

    /// Check the status and parse an unavailability from a mutation response
    async fn parse_record(
        response: reqwest::Response,
        resource_id: &str,
    ) -> Result<Unavailability, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let mut record: Unavailability = response.json().await?;
        record.resource_id = resource_id.to_string();
        Ok(record)
    }
}

#[async_trait]
impl ResourceApi for HttpResourceApi {
    async fn list_resources(&self) -> Result<Vec<Resource>> {
        let url = self.endpoint("resources/resource")?;
        let resources: Vec<Resource> = self.paginated_get(url, &[]).await?;

        info!(count = resources.len(), "Retrieved resources");
        Ok(resources)
    }

    async fn list_unavailabilities(
        &self,
        resource_id: &str,
        window_start: DateTime<Utc>,
    ) -> Result<Vec<Unavailability>> {
        let url = self.endpoint(&format!("resources/resource/{resource_id}/unavailability"))?;
        let params = [(
            "start_time",
            window_start.to_rfc3339_opts(SecondsFormat::Secs, true),
        )];

        let mut records: Vec<Unavailability> = self.paginated_get(url, &params).await?;
        for record in &mut records {
            record.resource_id = resource_id.to_string();
        }

        debug!(
            resource_id = %resource_id,
            count = records.len(),
            "Retrieved unavailabilities"
        );
        Ok(records)
    }

    async fn create_unavailability(&self, record: &Unavailability) -> Result<Unavailability> {
        let url = self.endpoint(&format!(
            "resources/resource/{}/unavailability",
            record.resource_id
        ))?;
        let token = self.tokens.token().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .json(&UnavailabilityPayload::from(record))
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let created = Self::parse_record(response, &record.resource_id).await?;
        debug!(
            resource_id = %record.resource_id,
            id = ?created.id,
            "Created unavailability"
        );
        Ok(created)
    }

    async fn update_unavailability(&self, record: &Unavailability) -> Result<Unavailability> {
        // Precondition: never hit the network for a record that was not persisted
        let id = record.id.as_deref().ok_or(ApiError::MissingId)?;

        let url = self.endpoint(&format!(
            "resources/resource/{}/unavailability/{id}",
            record.resource_id
        ))?;
        let token = self.tokens.token().await?;

        let response = self
            .client
            .put(url)
            .bearer_auth(&token)
            .json(&UnavailabilityPayload::from(record))
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let updated = Self::parse_record(response, &record.resource_id).await?;
        debug!(
            resource_id = %record.resource_id,
            id = %id,
            "Updated unavailability"
        );
        Ok(updated)
    }

    async fn delete_unavailability(&self, resource_id: &str, id: &str) -> Result<()> {
        let url = self.endpoint(&format!(
            "resources/resource/{resource_id}/unavailability/{id}"
        ))?;
        let token = self.tokens.token().await?;

        let response = self
            .client
            .delete(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body }.into());
        }

        debug!(resource_id = %resource_id, id = %id, "Deleted unavailability");
        Ok(())
    }
}
