use std::collections::HashMap;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::auth::guard::{require_csrf, AdminToken, AdminUser};
use crate::db::queries;
use crate::dto::{
    NewsletterStatsResponse, OrderDto, OrderStatusRequest, OrdersResponse, PriceUpdateRequest,
    ResendAudiobookRequest,
};
use crate::error::AppError;
use crate::state::AppState;

/// Orders dashboard: orders joined with their status history in memory.
pub async fn list_orders(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<OrdersResponse>, AppError> {
    let orders = queries::list_orders(&state.db)
        .await
        .map_err(|e| AppError::Upstream(format!("list orders: {e}")))?;
    let history = queries::list_status_history(&state.db)
        .await
        .map_err(|e| AppError::Upstream(format!("list status history: {e}")))?;

    let mut by_order: HashMap<i64, Vec<_>> = HashMap::new();
    for change in history {
        by_order.entry(change.order_id).or_default().push(change);
    }

    let orders = orders
        .into_iter()
        .map(|order| {
            let history = by_order.remove(&order.id).unwrap_or_default();
            OrderDto { order, history }
        })
        .collect();

    Ok(Json(OrdersResponse { orders }))
}

pub async fn update_order_status(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<OrderStatusRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    const KNOWN_STATUSES: &[&str] = &["paid", "fulfilled", "refunded", "cancelled"];
    if !KNOWN_STATUSES.contains(&body.status.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unknown status: {}",
            body.status
        )));
    }

    queries::update_order_status(&state.db, body.order_id, &body.status, body.note.as_deref())
        .await
        .map_err(|e| AppError::Upstream(format!("update order status: {e}")))?;

    tracing::info!("Order {} moved to {}", body.order_id, body.status);
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Resends the audiobook delivery email for a past purchase.
///
/// Three sequential provider calls: session lookup, line-item listing, email
/// send. None are retried; the first failure aborts the flow.
///
/// Uses [`AdminToken`] + [`require_csrf`] instead of [`AdminUser`] because
/// the admin page submits the CSRF token in the body on this route.
pub async fn resend_audiobook(
    _admin: AdminToken,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ResendAudiobookRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let csrf_header = headers.get("x-csrf-token").and_then(|v| v.to_str().ok());
    require_csrf(csrf_header, body.csrf_token.as_deref())?;

    if body.session_id.is_empty() {
        return Err(AppError::BadRequest("session_id is required".to_string()));
    }

    let session = state
        .payments
        .retrieve_checkout_session(&body.session_id)
        .await
        .map_err(|e| AppError::Upstream(format!("resend lookup: {e}")))?;

    if session.payment_status != "paid" {
        return Err(AppError::BadRequest(
            "Session is not a paid purchase".to_string(),
        ));
    }

    let line_items = state
        .payments
        .list_line_items(&body.session_id)
        .await
        .map_err(|e| AppError::Upstream(format!("resend line items: {e}")))?;

    let audiobook_price = &state.config.checkout.audiobook_price_id;
    let bought_audiobook = line_items.iter().any(|item| {
        item.price
            .as_ref()
            .map(|p| &p.id == audiobook_price)
            .unwrap_or(false)
    });
    if !bought_audiobook {
        return Err(AppError::BadRequest(
            "Session does not include the audiobook".to_string(),
        ));
    }

    let recipient = body
        .email
        .as_deref()
        .or_else(|| session.customer_email())
        .ok_or_else(|| AppError::BadRequest("No recipient email on session".to_string()))?;

    let download_url = &state.config.checkout.audiobook_download_url;
    if download_url.is_empty() {
        return Err(AppError::ServiceUnavailable(
            "Audiobook delivery is not configured".to_string(),
        ));
    }

    let html = format!(
        "<p>Thanks again for your purchase. Your audiobook download link is below.</p>\
         <p><a href=\"{download_url}\">Download the audiobook</a></p>"
    );

    state
        .email
        .send(recipient, "Your audiobook download", &html, None)
        .await
        .map_err(|e| AppError::Upstream(format!("resend email: {e}")))?;

    let items: Vec<String> = line_items
        .iter()
        .map(|item| format!("{} ×{}", item.description, item.quantity))
        .collect();
    tracing::info!("Audiobook resent for session {}", body.session_id);
    Ok(Json(serde_json::json!({
        "success": true,
        "sentTo": recipient,
        "items": items,
    })))
}

pub async fn update_price(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<PriceUpdateRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.price_id.is_empty() {
        return Err(AppError::BadRequest("price_id is required".to_string()));
    }
    if body.active.is_none() && body.nickname.is_none() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }

    let updated = state
        .payments
        .update_price(&body.price_id, body.active, body.nickname.as_deref())
        .await
        .map_err(|e| AppError::Upstream(format!("update price: {e}")))?;

    Ok(Json(updated))
}

pub async fn newsletter_stats(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<NewsletterStatsResponse>, AppError> {
    let subscriber_count = state
        .mailing_list
        .subscriber_count()
        .await
        .map_err(|e| AppError::Upstream(format!("subscriber count: {e}")))?;
    let campaigns = state
        .mailing_list
        .campaign_stats()
        .await
        .map_err(|e| AppError::Upstream(format!("campaign stats: {e}")))?;

    Ok(Json(NewsletterStatsResponse {
        subscriber_count,
        campaigns,
    }))
}
