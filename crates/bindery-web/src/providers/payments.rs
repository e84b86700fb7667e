//! Payment-provider client (Stripe-shaped REST API).
//!
//! Requests are form-encoded with bearer auth; responses are JSON. Only the
//! fields the handlers read are deserialized, everything else is ignored.

use serde::Deserialize;

use crate::config::PaymentsConfig;

#[derive(Clone)]
pub struct PaymentsClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// `paid`, `unpaid`, or `no_payment_required`.
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub amount_total: i64,
    #[serde(default)]
    pub currency: String,
    /// Hosted checkout URL, present on freshly created sessions.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

impl CheckoutSession {
    pub fn customer_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<PriceRef>,
}

#[derive(Debug, Deserialize)]
pub struct PriceRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

impl PaymentsClient {
    pub fn new(http: reqwest::Client, config: &PaymentsConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }

    pub async fn create_checkout_session(
        &self,
        price_id: &str,
        quantity: u32,
        success_url: &str,
        cancel_url: &str,
    ) -> anyhow::Result<CheckoutSession> {
        let quantity = quantity.to_string();
        let params = [
            ("mode", "payment"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", quantity.as_str()),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
        ];

        let response = self
            .http
            .post(format!("{}/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        Self::parse(response, "create checkout session").await
    }

    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> anyhow::Result<CheckoutSession> {
        let response = self
            .http
            .get(format!("{}/checkout/sessions/{session_id}", self.base_url))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        Self::parse(response, "retrieve checkout session").await
    }

    pub async fn list_line_items(&self, session_id: &str) -> anyhow::Result<Vec<LineItem>> {
        let response = self
            .http
            .get(format!(
                "{}/checkout/sessions/{session_id}/line_items",
                self.base_url
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        let envelope: ListEnvelope<LineItem> =
            Self::parse(response, "list line items").await?;
        Ok(envelope.data)
    }

    /// Mutates a price: toggle `active` and/or rename its nickname.
    pub async fn update_price(
        &self,
        price_id: &str,
        active: Option<bool>,
        nickname: Option<&str>,
    ) -> anyhow::Result<serde_json::Value> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(active) = active {
            params.push(("active", active.to_string()));
        }
        if let Some(nickname) = nickname {
            params.push(("nickname", nickname.to_string()));
        }
        if params.is_empty() {
            anyhow::bail!("price update with no fields to change");
        }

        let response = self
            .http
            .post(format!("{}/prices/{price_id}", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        Self::parse(response, "update price").await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> anyhow::Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("payments {what} failed: {status}: {body}");
        }
        Ok(response.json::<T>().await?)
    }
}
