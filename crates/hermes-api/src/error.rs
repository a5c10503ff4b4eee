use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use hermes_db::StoreError;
use hermes_gateway::SendError;

pub type ApiResult<T> = Result<T, ApiError>;

/// A structured failure response: HTTP status plus a reason string the
/// client can render. Every handler error ends up here; nothing panics the
/// process.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match &e {
            StoreError::UserNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::UsernameTaken(_) => StatusCode::CONFLICT,
            StoreError::AlreadyFriends | StoreError::SelfFriend => StatusCode::BAD_REQUEST,
            StoreError::Unavailable(reason) => {
                error!("store unavailable: {}", reason);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<SendError> for ApiError {
    fn from(e: SendError) -> Self {
        match e {
            SendError::Forbidden => Self::new(StatusCode::FORBIDDEN, e.to_string()),
            SendError::Store(inner) => inner.into(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        error!("spawn_blocking join error: {}", e);
        Self::internal("internal error")
    }
}
