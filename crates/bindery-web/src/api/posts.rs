use axum::extract::State;
use axum::Json;

use crate::db::models::PostRow;
use crate::db::queries;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostRow>>, AppError> {
    let posts = queries::list_published_posts(&state.db)
        .await
        .map_err(|e| AppError::Upstream(format!("list posts: {e}")))?;

    Ok(Json(posts))
}
