use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tracing::info;

use warbler_types::api::{MessageResponse, NewMessageForm};

use crate::ApiError;
use crate::error::found;
use crate::session::RequestContext;
use crate::state::{AppState, run_blocking};

/// POST /messages/new — post as the current user, then go to their profile.
pub async fn new_message(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Form(form): Form<NewMessageForm>,
) -> Result<Response, ApiError> {
    let user_id = ctx.require_user()?.id;

    let message_id = run_blocking(&state, move |db| Ok(db.insert_message(user_id, &form.text)?)).await?;

    info!("User {} posted message {}", user_id, message_id);
    Ok(found(format!("/users/{}", user_id)))
}

/// GET /messages/{id}
pub async fn show_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let (row, like_count) = run_blocking(&state, move |db| {
        let row = db.get_message(message_id)?.ok_or(ApiError::NotFound("Message"))?;
        let like_count = db.count_likes(message_id)?;
        Ok((row, like_count))
    })
    .await?;

    Ok(Json(MessageResponse {
        message: row.into_message(),
        like_count,
    }))
}

/// POST /messages/{id}/delete — only the author may delete.
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(message_id): Path<i64>,
) -> Result<Response, ApiError> {
    let user_id = ctx.require_user()?.id;

    run_blocking(&state, move |db| Ok(db.delete_message(message_id, user_id)?)).await?;

    info!("User {} deleted message {}", user_id, message_id);
    Ok(found(format!("/users/{}", user_id)))
}
