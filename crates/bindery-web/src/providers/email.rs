//! Transactional email client (Resend-shaped REST API).

use crate::config::EmailConfig;

#[derive(Clone)]
pub struct EmailClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
}

impl EmailClient {
    pub fn new(http: reqwest::Client, config: &EmailConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        }
    }

    /// Sends one HTML email. `reply_to` is set on contact-form relays so the
    /// owner can answer the sender directly.
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        reply_to: Option<&str>,
    ) -> anyhow::Result<()> {
        let mut body = serde_json::json!({
            "from": self.from,
            "to": [to],
            "subject": subject,
            "html": html,
        });
        if let Some(reply_to) = reply_to {
            body["reply_to"] = serde_json::json!(reply_to);
        }

        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("email send failed: {status}: {body}");
        }

        Ok(())
    }
}
