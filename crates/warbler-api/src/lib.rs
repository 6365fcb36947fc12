pub mod auth;
pub mod error;
pub mod flash;
pub mod home;
pub mod likes;
pub mod messages;
pub mod middleware;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use warbler_db::Database;

pub use error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub session_secret: String,
    pub session_ttl: chrono::Duration,
}

/// Every route, wrapped in the session loader. Tracing and CORS layers are
/// left to the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::home))
        .route("/signup", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/users", get(users::list_users))
        .route("/users/profile", post(users::edit_profile))
        .route("/users/delete", post(users::delete_user))
        .route("/users/follow/{id}", post(users::add_follow))
        .route("/users/stop-following/{id}", post(users::stop_following))
        .route("/users/{id}", get(users::show_user))
        .route("/users/{id}/following", get(users::show_following))
        .route("/users/{id}/followers", get(users::show_followers))
        .route("/users/{id}/likes", get(users::show_likes))
        .route("/messages/new", post(messages::new_message))
        .route("/messages/{id}", get(messages::show_message))
        .route("/messages/{id}/delete", post(messages::delete_message))
        .route("/messages/{id}/like", post(likes::toggle_like))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::load_session,
        ))
        .with_state(state)
}
