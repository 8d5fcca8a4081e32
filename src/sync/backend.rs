//! Remote backend seam
//!
//! The remote relational store is an external collaborator; the core
//! only depends on the `RemoteBackend` trait. `HttpBackend` is the
//! production implementation, speaking the backend's REST dialect.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Row-level operations the sync layer needs from the remote store.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Insert or update a row keyed by its `id` column.
    async fn upsert_row(&self, table: &str, row: Value) -> Result<()>;

    /// Delete the row with the given id. Deleting an absent row is not
    /// an error.
    async fn delete_row(&self, table: &str, id: &str) -> Result<()>;

    /// Fetch all rows owned by `user_id`.
    async fn fetch_rows(&self, table: &str, user_id: &str) -> Result<Vec<Value>>;

    /// Delete a stored artifact (an uploaded image) by its URL.
    async fn delete_artifact(&self, url: &str) -> Result<()>;
}

/// HTTP implementation of [`RemoteBackend`] against a PostgREST-style
/// row API.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("notesync")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    fn check_status(response: &reqwest::Response, context: &str) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AppError::RemoteWrite(format!(
                "{context} returned status {status}"
            )))
        }
    }
}

#[async_trait]
impl RemoteBackend for HttpBackend {
    async fn upsert_row(&self, table: &str, row: Value) -> Result<()> {
        let response = self
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", "id")])
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&row)
            .send()
            .await?;

        Self::check_status(&response, &format!("upsert into {table}"))
    }

    async fn delete_row(&self, table: &str, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        Self::check_status(&response, &format!("delete from {table}"))
    }

    async fn fetch_rows(&self, table: &str, user_id: &str) -> Result<Vec<Value>> {
        let response = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*".to_string()), ("user_id", format!("eq.{user_id}"))])
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        Self::check_status(&response, &format!("fetch from {table}"))?;

        let rows = response.json::<Vec<Value>>().await?;
        Ok(rows)
    }

    async fn delete_artifact(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .delete(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        Self::check_status(&response, "delete artifact")
    }
}
