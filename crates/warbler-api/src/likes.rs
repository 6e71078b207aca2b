use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::ApiError;
use crate::error::found;
use crate::session::RequestContext;
use crate::state::{AppState, run_blocking};

/// POST /messages/{id}/like — like if not yet liked, unlike otherwise.
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(message_id): Path<i64>,
) -> Result<Response, ApiError> {
    let user_id = ctx.require_user()?.id;
    let allow_self_like = state.allow_self_like;

    let liked = run_blocking(&state, move |db| {
        Ok(db.toggle_like(user_id, message_id, allow_self_like)?)
    })
    .await?;

    if liked {
        info!("User {} liked message {}", user_id, message_id);
    } else {
        info!("User {} unliked message {}", user_id, message_id);
    }
    Ok(found("/"))
}

/// GET /users/{id}/likes
pub async fn liked_messages(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_user()?;

    let messages = run_blocking(&state, move |db| {
        if db.get_user_by_id(user_id)?.is_none() {
            return Err(ApiError::NotFound("User"));
        }
        Ok(db
            .liked_messages(user_id)?
            .into_iter()
            .map(|row| row.into_message())
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(messages))
}
