pub mod auth;
pub mod error;
pub mod home;
pub mod likes;
pub mod messages;
pub mod registry;
pub mod routes;
pub mod session;
pub mod state;
pub mod users;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};
