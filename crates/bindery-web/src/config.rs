use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub mailing_list: MailingListConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for session tokens. Empty means token issuance and the
    /// admin surface answer 503 rather than running with a weak default.
    #[serde(default)]
    pub session_secret: String,
    /// Argon2 PHC hash of the admin password (see the `hash_password` bin).
    #[serde(default)]
    pub admin_password_hash: String,
    #[serde(default = "default_session_ttl_seconds")]
    pub session_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_attempts")]
    pub max_login_attempts: usize,
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_payments_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_email_base_url")]
    pub base_url: String,
    /// Sender address for transactional mail.
    #[serde(default)]
    pub from: String,
    /// Where contact-form submissions are delivered.
    #[serde(default)]
    pub contact_recipient: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailingListConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_mailing_list_base_url")]
    pub base_url: String,
    /// Optional group new subscribers are added to.
    #[serde(default)]
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// SQL-over-HTTP query endpoint.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub auth_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutConfig {
    /// Payment-provider price id for the paperback.
    #[serde(default)]
    pub book_price_id: String,
    /// Payment-provider price id for the audiobook.
    #[serde(default)]
    pub audiobook_price_id: String,
    #[serde(default)]
    pub success_url: String,
    #[serde(default)]
    pub cancel_url: String,
    /// Signed/stable download link included in audiobook delivery emails.
    #[serde(default)]
    pub audiobook_download_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: String::new(),
            admin_password_hash: String::new(),
            session_ttl_seconds: default_session_ttl_seconds(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: default_max_attempts(),
            window_seconds: default_window_seconds(),
        }
    }
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            base_url: default_payments_base_url(),
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_email_base_url(),
            from: String::new(),
            contact_recipient: String::new(),
        }
    }
}

impl Default for MailingListConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_mailing_list_base_url(),
            group_id: None,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8787".parse().unwrap()
}

fn default_session_ttl_seconds() -> u64 { 7200 }
fn default_max_attempts() -> usize { 5 }
fn default_window_seconds() -> u64 { 900 }
fn default_payments_base_url() -> String { "https://api.stripe.com/v1".to_string() }
fn default_email_base_url() -> String { "https://api.resend.com".to_string() }
fn default_mailing_list_base_url() -> String {
    "https://connect.mailerlite.com/api".to_string()
}

impl ServerConfig {
    /// Returns `true` when the admin surface is fully configured.
    pub fn has_admin_auth(&self) -> bool {
        !self.auth.session_secret.is_empty() && !self.auth.admin_password_hash.is_empty()
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("BINDERY_CONFIG").map(PathBuf::from).ok();

        let mut config = if let Some(path) = config_path {
            let contents = std::fs::read_to_string(&path)?;
            toml::from_str(&contents)?
        } else {
            ServerConfig {
                bind_addr: default_bind_addr(),
                auth: AuthConfig::default(),
                rate_limit: RateLimitConfig::default(),
                tls: TlsConfig::default(),
                payments: PaymentsConfig::default(),
                email: EmailConfig::default(),
                mailing_list: MailingListConfig::default(),
                database: DatabaseConfig::default(),
                checkout: CheckoutConfig::default(),
            }
        };

        if let Ok(secret) = std::env::var("BINDERY_SESSION_SECRET") {
            config.auth.session_secret = secret;
        }
        if let Ok(hash) = std::env::var("BINDERY_ADMIN_PASSWORD_HASH") {
            config.auth.admin_password_hash = hash;
        }
        if let Ok(key) = std::env::var("BINDERY_PAYMENTS_SECRET_KEY") {
            config.payments.secret_key = key;
        }
        if let Ok(key) = std::env::var("BINDERY_EMAIL_API_KEY") {
            config.email.api_key = key;
        }
        if let Ok(key) = std::env::var("BINDERY_MAILING_LIST_API_KEY") {
            config.mailing_list.api_key = key;
        }
        if let Ok(url) = std::env::var("BINDERY_DATABASE_URL") {
            config.database.url = url;
        }
        if let Ok(token) = std::env::var("BINDERY_DATABASE_AUTH_TOKEN") {
            config.database.auth_token = token;
        }
        if let Ok(addr) = std::env::var("BINDERY_BIND_ADDR") {
            config.bind_addr = addr.parse()?;
        }
        if let Ok(cert) = std::env::var("BINDERY_TLS_CERT") {
            config.tls.cert_path = Some(cert);
        }
        if let Ok(key) = std::env::var("BINDERY_TLS_KEY") {
            config.tls.key_path = Some(key);
        }

        // A missing secret fails closed per-request (503), but a known
        // placeholder value must not make it into production at all.
        if !config.auth.session_secret.is_empty() {
            const WEAK_SECRETS: &[&str] = &[
                "change-me-to-a-random-secret",
                "secret",
                "password",
                "session-secret",
            ];
            if WEAK_SECRETS.iter().any(|&w| config.auth.session_secret == w) {
                anyhow::bail!(
                    "Session secret matches a known weak/placeholder value. \
                     Set a strong random secret via BINDERY_SESSION_SECRET."
                );
            }
            if config.auth.session_secret.len() < 32 {
                tracing::warn!(
                    "Session secret is shorter than 32 characters. \
                     Consider using a stronger secret via BINDERY_SESSION_SECRET."
                );
            }
        } else {
            tracing::warn!(
                "No session secret configured. Login and admin endpoints will answer 503."
            );
        }

        // Security: restrict binding when the admin surface is unguarded
        if !config.has_admin_auth() && config.bind_addr.ip().is_unspecified() {
            if std::env::var("BINDERY_INSECURE").is_ok() {
                tracing::warn!(
                    "Running WITHOUT admin authentication on all interfaces ({}).",
                    config.bind_addr
                );
            } else {
                let safe_addr: SocketAddr = ([127, 0, 0, 1], config.bind_addr.port()).into();
                tracing::warn!(
                    "No admin authentication configured. Binding to {} instead of {} for safety. \
                     Set BINDERY_INSECURE=1 to override (NOT RECOMMENDED).",
                    safe_addr,
                    config.bind_addr
                );
                config.bind_addr = safe_addr;
            }
        }

        Ok(config)
    }
}
