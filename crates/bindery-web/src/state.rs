use std::sync::Arc;

use bindery_core::LoginRateLimiter;

use crate::config::ServerConfig;
use crate::db::Database;
use crate::providers::{EmailClient, MailingListClient, PaymentsClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Injected failed-login limiter; per-process state only.
    pub login_limiter: Arc<LoginRateLimiter>,
    pub payments: PaymentsClient,
    pub email: EmailClient,
    pub mailing_list: MailingListClient,
    pub db: Database,
}
