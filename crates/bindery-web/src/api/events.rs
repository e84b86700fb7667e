use axum::extract::State;
use axum::Json;

use crate::db::queries;
use crate::dto::ListenEventRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Audiobook player beacon. One insert per event, no batching.
pub async fn record_listen(
    State(state): State<AppState>,
    Json(body): Json<ListenEventRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    queries::insert_listen_event(&state.db, body.chapter, body.position_seconds)
        .await
        .map_err(|e| AppError::Upstream(format!("listen event: {e}")))?;

    Ok(Json(serde_json::json!({ "success": true })))
}
