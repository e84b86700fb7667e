use axum::extract::{Query, State};
use axum::Json;

use crate::db::queries;
use crate::dto::{
    BookFormat, CheckoutRequest, CheckoutResponse, CheckoutSessionQuery, CheckoutSessionResponse,
};
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_checkout(
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    if body.quantity == 0 || body.quantity > 10 {
        return Err(AppError::BadRequest(
            "Quantity must be between 1 and 10".to_string(),
        ));
    }

    let checkout = &state.config.checkout;
    let price_id = match body.format {
        BookFormat::Paperback => &checkout.book_price_id,
        BookFormat::Audiobook => &checkout.audiobook_price_id,
    };
    if price_id.is_empty() {
        return Err(AppError::ServiceUnavailable(
            "Checkout is not configured".to_string(),
        ));
    }

    let session = state
        .payments
        .create_checkout_session(
            price_id,
            body.quantity,
            &checkout.success_url,
            &checkout.cancel_url,
        )
        .await
        .map_err(|e| AppError::Upstream(format!("create checkout: {e}")))?;

    let url = session
        .url
        .ok_or_else(|| AppError::Upstream("checkout session missing url".to_string()))?;

    Ok(Json(CheckoutResponse {
        session_id: session.id,
        url,
    }))
}

/// Thank-you page lookup. On a paid session the order row is recorded as a
/// best-effort side action so the page never breaks over a datastore hiccup.
pub async fn get_checkout_session(
    State(state): State<AppState>,
    Query(query): Query<CheckoutSessionQuery>,
) -> Result<Json<CheckoutSessionResponse>, AppError> {
    if query.session_id.is_empty() {
        return Err(AppError::BadRequest("session_id is required".to_string()));
    }

    let session = state
        .payments
        .retrieve_checkout_session(&query.session_id)
        .await
        .map_err(|e| AppError::Upstream(format!("retrieve checkout: {e}")))?;

    if session.payment_status == "paid" && state.db.is_configured() {
        if let Err(e) = queries::insert_order(
            &state.db,
            &session.id,
            session.customer_email(),
            session.amount_total,
            &session.currency,
            &session.payment_status,
        )
        .await
        {
            tracing::error!("Failed to record order for {}: {e:#}", session.id);
        }
    }

    Ok(Json(CheckoutSessionResponse {
        status: session.payment_status,
        customer_email: session.customer_details.and_then(|d| d.email),
        amount_total: session.amount_total,
        currency: session.currency,
    }))
}
