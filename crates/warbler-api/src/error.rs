use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use thiserror::Error;
use tracing::{error, warn};

use warbler_crypto::CredentialError;
use warbler_db::StoreError;
use warbler_types::api::ErrorResponse;
use warbler_types::flash::{FLASH_COOKIE, Flash};

#[derive(Debug, Error)]
pub enum ApiError {
    /// No valid session, or the session's user no longer exists.
    #[error("Access unauthorized")]
    Unauthenticated,

    /// Authenticated, but acting on someone else's resource.
    #[error("Access unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => Self::DuplicateUsername,
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::Unauthorized(why) => Self::Unauthorized(why),
            StoreError::InvalidInput(msg) => Self::InvalidInput(msg),
            StoreError::Sqlite(e) => Self::Internal(format!("Database error: {}", e)),
            StoreError::LockPoisoned(e) => Self::Internal(format!("DB lock poisoned: {}", e)),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            // Redirect home and flash the one canonical notice.
            Self::Unauthenticated | Self::Unauthorized(_) => {
                warn!("{}", self);
                return flash_redirect(CookieJar::new(), Flash::AccessUnauthorized, "/");
            }
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateUsername | Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Internal(msg) => {
                error!("{}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        };
        (status, Json(ErrorResponse { error: body })).into_response()
    }
}

/// `302 Found` to `location`.
pub fn found(location: impl Into<String>) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.into())]).into_response()
}

/// Redirect to `location`, leaving `flash` for the next page to render.
pub fn flash_redirect(jar: CookieJar, flash: Flash, location: &str) -> Response {
    let cookie = Cookie::build((FLASH_COOKIE, flash.code()))
        .path("/")
        .http_only(true);
    (jar.add(cookie), found(location)).into_response()
}
