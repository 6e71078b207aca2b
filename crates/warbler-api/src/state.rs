use std::sync::Arc;

use tracing::error;

use warbler_db::Database;

use crate::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Lifetime of a session token, in days.
    pub session_days: i64,
    /// Whether users may like their own messages.
    pub allow_self_like: bool,
    /// Maximum number of messages on the home timeline.
    pub timeline_limit: u32,
}

/// Run blocking store work off the async runtime.
pub async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(format!("blocking task failed: {}", e))
        })?
}
