use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;

use hermes_types::api::{AddFriendRequest, FriendResponse};

use crate::AppState;
use crate::error::ApiResult;

/// Establish the symmetric friendship. Both identities must exist; the
/// relation is written to both sides atomically or not at all.
pub async fn add_friend(
    State(state): State<AppState>,
    Json(req): Json<AddFriendRequest>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.clone();
    let username = req.username.clone();
    let friend = req.friend_username.clone();
    tokio::task::spawn_blocking(move || db.add_friendship(&username, &friend)).await??;

    info!("{} and {} are now friends", req.username, req.friend_username);
    Ok(Json(json!({ "message": "Friend added successfully" })))
}

pub async fn list_friends(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.clone();
    let name = username.clone();
    let friends = tokio::task::spawn_blocking(move || db.friends_of(&name)).await??;

    let friends: Vec<FriendResponse> = friends
        .into_iter()
        .map(|username| FriendResponse { username })
        .collect();

    Ok(Json(friends))
}
