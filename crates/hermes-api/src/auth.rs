use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;
use uuid::Uuid;

use hermes_types::api::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "username must be 3-32 characters",
        ));
    }
    if req.password.len() < 8 {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "password must be at least 8 characters",
        ));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {}", e)))?
        .to_string();

    let user_id = Uuid::new_v4();

    let db = state.db.clone();
    let username = req.username.clone();
    let uid = user_id.to_string();
    tokio::task::spawn_blocking(move || db.create_user(&uid, &username, &password_hash)).await??;

    info!("registered user {} ({})", req.username, user_id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            username: req.username,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let db = state.db.clone();
    let username = req.username.clone();
    let user = tokio::task::spawn_blocking(move || db.get_user_by_username(&username)).await??;

    // Missing user and bad password get the same answer.
    let user = user.ok_or_else(invalid_credentials)?;

    if !verify_password(&user.password, &req.password) {
        return Err(invalid_credentials());
    }

    Ok(Json(LoginResponse {
        username: user.username,
    }))
}

/// Credential verification collaborator: a plain yes/no check against the
/// stored Argon2 hash.
fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn invalid_credentials() -> ApiError {
    ApiError::new(StatusCode::UNAUTHORIZED, "invalid username or password")
}
