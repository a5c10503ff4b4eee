pub mod auth;
pub mod error;
pub mod friends;
pub mod messages;
pub mod profile;

pub use error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use hermes_db::Database;
use hermes_gateway::DeliveryCoordinator;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub coordinator: DeliveryCoordinator,
}

/// HTTP routes. The websocket upgrade route lives in the server binary; it
/// shares the coordinator held here.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/add-friend", post(friends::add_friend))
        .route("/friends/{username}", get(friends::list_friends))
        .route("/message", post(messages::send_message))
        .route("/messages/{user1}/{user2}", get(messages::get_messages))
        .route(
            "/user/{username}/bio",
            get(profile::get_bio).put(profile::update_bio),
        )
        .route(
            "/user/{username}/nickname",
            get(profile::get_nickname).put(profile::update_nickname),
        )
        .with_state(state)
}
