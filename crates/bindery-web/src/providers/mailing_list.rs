//! Mailing-list client (MailerLite-shaped REST API).

use serde::{Deserialize, Serialize};

use crate::config::MailingListConfig;

#[derive(Clone)]
pub struct MailingListClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    group_id: Option<String>,
}

/// One sent campaign's headline numbers, as surfaced on the admin dashboard.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStats {
    pub id: String,
    #[serde(alias = "name")]
    pub subject: String,
    #[serde(default, alias = "sent")]
    pub recipients: u64,
    #[serde(default, alias = "opens_count")]
    pub opens: u64,
    #[serde(default, alias = "clicks_count")]
    pub clicks: u64,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    total: u64,
}

impl MailingListClient {
    pub fn new(http: reqwest::Client, config: &MailingListConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            group_id: config.group_id.clone(),
        }
    }

    /// Creates (or upserts) a subscriber; idempotent on the provider side.
    pub async fn create_subscriber(&self, email: &str, name: Option<&str>) -> anyhow::Result<()> {
        let mut body = serde_json::json!({ "email": email });
        if let Some(name) = name {
            body["fields"] = serde_json::json!({ "name": name });
        }
        if let Some(group_id) = &self.group_id {
            body["groups"] = serde_json::json!([group_id]);
        }

        let response = self
            .http
            .post(format!("{}/subscribers", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("subscriber create failed: {status}: {body}");
        }

        Ok(())
    }

    pub async fn subscriber_count(&self) -> anyhow::Result<u64> {
        let response = self
            .http
            .get(format!("{}/subscribers?limit=1", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("subscriber count failed: {status}: {body}");
        }

        let envelope: ListEnvelope<serde_json::Value> = response.json().await?;
        Ok(envelope
            .meta
            .map(|m| m.total)
            .unwrap_or(envelope.data.len() as u64))
    }

    /// Headline stats for the most recently sent campaigns.
    pub async fn campaign_stats(&self) -> anyhow::Result<Vec<CampaignStats>> {
        let response = self
            .http
            .get(format!(
                "{}/campaigns?filter[status]=sent&limit=10",
                self.base_url
            ))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("campaign stats failed: {status}: {body}");
        }

        let envelope: ListEnvelope<CampaignStats> = response.json().await?;
        Ok(envelope.data)
    }
}
