use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::session::load_session;
use crate::state::AppState;
use crate::{auth, home, likes, messages, users};

/// Every route, with the session gate in front. Transport layers (CORS,
/// tracing) are added by the server.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::home))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/users", get(users::list_users))
        .route("/users/profile", post(users::update_profile))
        .route("/users/delete", post(users::delete_user))
        .route("/users/follow/{id}", post(users::follow))
        .route("/users/stop-following/{id}", post(users::stop_following))
        .route("/users/{id}", get(users::show_user))
        .route("/users/{id}/following", get(users::show_following))
        .route("/users/{id}/followers", get(users::show_followers))
        .route("/users/{id}/likes", get(likes::liked_messages))
        .route("/messages/new", post(messages::new_message))
        .route("/messages/{id}", get(messages::show_message))
        .route("/messages/{id}/delete", post(messages::delete_message))
        .route("/messages/{id}/like", post(likes::toggle_like))
        .layer(middleware::from_fn_with_state(state.clone(), load_session))
        .with_state(state)
}
