mod admin;
mod auth_handlers;
mod checkout;
mod contact;
mod events;
mod newsletter;
mod posts;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Routes open to anyone.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/verify", get(auth_handlers::verify))
        .route("/checkout", post(checkout::create_checkout))
        .route("/checkout/session", get(checkout::get_checkout_session))
        .route("/listen", post(events::record_listen))
        .route("/posts", get(posts::list_posts))
}

/// Form endpoints, split out so main can wrap them in the bot guard.
pub fn form_router() -> Router<AppState> {
    Router::new()
        .route("/contact", post(contact::submit_contact))
        .route("/newsletter/subscribe", post(newsletter::subscribe))
}

/// Admin surface; every handler authenticates via the guard extractors.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/orders/status", post(admin::update_order_status))
        .route("/admin/resend-audiobook", post(admin::resend_audiobook))
        .route("/admin/price", post(admin::update_price))
        .route("/admin/newsletter/stats", get(admin::newsletter_stats))
}
