use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use hermes_types::api::SendMessageRequest;

use crate::AppState;
use crate::error::ApiResult;

/// One send, end to end: authorization gate, append, broadcast. The
/// coordinator owns the ordering; this handler only translates the outcome
/// to HTTP.
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = state
        .coordinator
        .send(&req.sender, &req.receiver, &req.content)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn get_messages(
    State(state): State<AppState>,
    Path((user1, user2)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let messages = state.coordinator.conversation(&user1, &user2).await?;
    Ok(Json(messages))
}
