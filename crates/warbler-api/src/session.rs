//! Session gate.
//!
//! A session is an HS256 token whose `sub` is the current user's id. It is
//! read from `Authorization: Bearer <token>` or, failing that, from the
//! `curr_user` cookie. [`load_session`] resolves it once per request into a
//! [`RequestContext`] extension; handlers that mutate state call
//! [`RequestContext::require_user`] before touching the store.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{debug, warn};

use warbler_types::api::Claims;
use warbler_types::models::User;

use crate::ApiError;
use crate::state::{AppState, run_blocking};

pub const SESSION_COOKIE: &str = "curr_user";

/// Request-scoped identity. Inserted by [`load_session`] on every request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub current_user: Option<User>,
}

impl RequestContext {
    pub fn require_user(&self) -> Result<&User, ApiError> {
        self.current_user.as_ref().ok_or(ApiError::Unauthenticated)
    }
}

pub fn create_token(secret: &str, user_id: i64, username: &str, days: i64) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(days)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    jar.remove(cookie)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Resolve the caller's session into a [`RequestContext`].
///
/// An absent, malformed or expired token, or one naming a user that no
/// longer exists, yields an anonymous context rather than an error.
pub async fn load_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()));

    let mut ctx = RequestContext::default();
    if let Some(token) = token {
        match decode_token(&state.jwt_secret, &token) {
            Some(claims) => {
                let user_id = claims.sub;
                let row = run_blocking(&state, move |db| Ok(db.get_user_by_id(user_id)?)).await?;
                match row {
                    Some(row) => ctx.current_user = Some(row.into_user()),
                    None => warn!("Session refers to missing user {}", user_id),
                }
            }
            None => debug!("Ignoring invalid session token"),
        }
    }

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}
