use bindery_core::rows::{normalize_rows, Row};
use serde_json::Value;

use crate::config::DatabaseConfig;

/// SQL-over-HTTP datastore client.
///
/// Sends `{ "query": …, "params": … }` to the configured endpoint and
/// normalizes whatever row shape the driver answers with.
#[derive(Clone)]
pub struct Database {
    http: reqwest::Client,
    url: String,
    auth_token: String,
}

impl Database {
    pub fn new(http: reqwest::Client, config: &DatabaseConfig) -> Self {
        Self {
            http,
            url: config.url.clone(),
            auth_token: config.auth_token.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
    }

    /// Runs one parameterized statement and returns the normalized rows.
    pub async fn query(&self, sql: &str, params: Vec<Value>) -> anyhow::Result<Vec<Row>> {
        if !self.is_configured() {
            anyhow::bail!("datastore is not configured");
        }

        let mut request = self
            .http
            .post(&self.url)
            .json(&serde_json::json!({ "query": sql, "params": params }));
        if !self.auth_token.is_empty() {
            request = request.bearer_auth(&self.auth_token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("datastore query failed: {status}: {body}");
        }

        let payload: Value = response.json().await?;
        let rows = normalize_rows(&payload);
        tracing::debug!("datastore returned {} row(s)", rows.len());
        Ok(rows)
    }

    /// Like [`query`](Self::query) for statements whose rows nobody reads.
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> anyhow::Result<()> {
        self.query(sql, params).await.map(|_| ())
    }
}
