use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use warbler_types::api::{AuthResponse, LoginRequest, SignupRequest};
use warbler_types::flash::Flash;
use warbler_types::models::User;

use crate::error::flash_redirect;
use crate::registry::{self, Signup};
use crate::session::{clear_session, create_token, session_cookie};
use crate::state::{AppState, run_blocking};
use crate::ApiError;

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(&state, move |db| {
        registry::signup(
            db,
            Signup {
                id: None,
                username: &req.username,
                email: &req.email,
                password: &req.password,
                image_url: req.image_url.as_deref(),
            },
        )
    })
    .await?;

    let (jar, body) = start_session(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, body))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(&state, move |db| {
        registry::authenticate(db, &req.username, &req.password)
    })
    .await?
    .ok_or(ApiError::InvalidCredentials)?;

    info!("User {} logged in", user.username);
    start_session(&state, jar, &user)
}

pub async fn logout(jar: CookieJar) -> Response {
    flash_redirect(clear_session(jar), Flash::LoggedOut, "/")
}

fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let token = create_token(&state.jwt_secret, user.id, &user.username, state.session_days)
        .map_err(|e| ApiError::Internal(format!("token encoding failed: {}", e)))?;

    Ok((
        jar.add(session_cookie(token.clone())),
        Json(AuthResponse {
            user_id: user.id,
            username: user.username.clone(),
            token,
        }),
    ))
}
