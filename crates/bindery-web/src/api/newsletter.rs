use axum::extract::State;
use axum::Json;

use crate::dto::SubscribeRequest;
use crate::error::AppError;
use crate::state::AppState;

pub async fn subscribe(
    State(state): State<AppState>,
    Json(body): Json<SubscribeRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let email = body.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("A valid email is required".to_string()));
    }

    state
        .mailing_list
        .create_subscriber(email, body.name.as_deref())
        .await
        .map_err(|e| AppError::Upstream(format!("newsletter subscribe: {e}")))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "You're on the list."
    })))
}
