//! Profile field storage: plain get/set of bio and nickname on the user
//! record. Adjacent to the messaging core, no authorization of its own.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use hermes_db::models::ProfileField;
use hermes_types::api::{
    BioResponse, NicknameResponse, UpdateBioRequest, UpdateNicknameRequest,
};

use crate::AppState;
use crate::error::ApiResult;

pub async fn get_bio(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.clone();
    let bio =
        tokio::task::spawn_blocking(move || db.profile_field(&username, ProfileField::Bio))
            .await??;
    Ok(Json(BioResponse { bio }))
}

pub async fn update_bio(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<UpdateBioRequest>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.clone();
    tokio::task::spawn_blocking(move || {
        db.set_profile_field(&username, ProfileField::Bio, &req.bio)
    })
    .await??;
    Ok(Json(json!({ "message": "Bio updated successfully" })))
}

pub async fn get_nickname(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.clone();
    let nickname =
        tokio::task::spawn_blocking(move || db.profile_field(&username, ProfileField::Nickname))
            .await??;
    Ok(Json(NicknameResponse { nickname }))
}

pub async fn update_nickname(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<UpdateNicknameRequest>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.clone();
    tokio::task::spawn_blocking(move || {
        db.set_profile_field(&username, ProfileField::Nickname, &req.nickname)
    })
    .await??;
    Ok(Json(json!({ "message": "Nickname updated successfully" })))
}
