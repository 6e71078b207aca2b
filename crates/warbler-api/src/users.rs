use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use warbler_db::Database;
use warbler_db::models::UserRow;
use warbler_types::api::{ProfileUpdateRequest, UserProfileResponse, UserSearchQuery};
use warbler_types::flash::Flash;
use warbler_types::models::User;

use crate::ApiError;
use crate::error::{flash_redirect, found};
use crate::registry;
use crate::session::{RequestContext, clear_session};
use crate::state::{AppState, run_blocking};

/// GET /users?q=
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let users = run_blocking(&state, move |db| {
        let search = query.q.as_deref().filter(|q| !q.is_empty());
        Ok(into_users(db.search_users(search)?))
    })
    .await?;

    Ok(Json(users))
}

/// GET /users/{id} — profile, counters and the user's messages.
pub async fn show_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = run_blocking(&state, move |db| {
        let user = registry::load_user(db, user_id)?;
        let messages: Vec<_> = db
            .messages_for_user(user_id)?
            .into_iter()
            .map(|row| row.into_message())
            .collect();

        Ok(UserProfileResponse {
            message_count: messages.len(),
            following_count: db.count_following(user_id)?,
            follower_count: db.count_followers(user_id)?,
            like_count: db.count_liked_by(user_id)?,
            user,
            messages,
        })
    })
    .await?;

    Ok(Json(profile))
}

/// GET /users/{id}/following
pub async fn show_following(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_user()?;
    let users = run_blocking(&state, move |db| {
        ensure_user(db, user_id)?;
        Ok(into_users(db.following(user_id)?))
    })
    .await?;
    Ok(Json(users))
}

/// GET /users/{id}/followers
pub async fn show_followers(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.require_user()?;
    let users = run_blocking(&state, move |db| {
        ensure_user(db, user_id)?;
        Ok(into_users(db.followers(user_id)?))
    })
    .await?;
    Ok(Json(users))
}

/// POST /users/follow/{id}
pub async fn follow(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(followed_id): Path<i64>,
) -> Result<Response, ApiError> {
    let user_id = ctx.require_user()?.id;

    let created = run_blocking(&state, move |db| Ok(db.follow(user_id, followed_id)?)).await?;
    if created {
        info!("User {} followed {}", user_id, followed_id);
    }
    Ok(found(format!("/users/{}/following", user_id)))
}

/// POST /users/stop-following/{id}
pub async fn stop_following(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(followed_id): Path<i64>,
) -> Result<Response, ApiError> {
    let user_id = ctx.require_user()?.id;

    let removed = run_blocking(&state, move |db| Ok(db.unfollow(user_id, followed_id)?)).await?;
    if removed {
        info!("User {} stopped following {}", user_id, followed_id);
    }
    Ok(found(format!("/users/{}/following", user_id)))
}

/// POST /users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Form(req): Form<ProfileUpdateRequest>,
) -> Result<Response, ApiError> {
    let user_id = ctx.require_user()?.id;

    run_blocking(&state, move |db| registry::update_profile(db, user_id, &req)).await?;

    info!("User {} updated their profile", user_id);
    Ok(found(format!("/users/{}", user_id)))
}

/// POST /users/delete — remove the current account and end the session.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let user_id = ctx.require_user()?.id;

    run_blocking(&state, move |db| Ok(db.delete_user(user_id)?)).await?;

    Ok(flash_redirect(clear_session(jar), Flash::AccountDeleted, "/"))
}

fn ensure_user(db: &Database, user_id: i64) -> Result<(), ApiError> {
    match db.get_user_by_id(user_id)? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound("User")),
    }
}

fn into_users(rows: Vec<UserRow>) -> Vec<User> {
    rows.into_iter().map(UserRow::into_user).collect()
}
