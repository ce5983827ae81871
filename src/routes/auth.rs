//! Auth routes for registration, login, and the authenticated profile

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::models::AuthUser;
use crate::auth::password;
use crate::error::ApiError;
use crate::routes::is_valid_email;
use crate::routes::users::UserResponse;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    let email = payload.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Fields 'name', 'email', and 'password' are required".to_string(),
        ));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email".to_string()));
    }

    if state.users.get_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&payload.password)?;
    let user = state
        .users
        .create(name, &email, &password_hash)
        .await
        .map_err(|e| ApiError::or_conflict(e, "User already exists"))?;

    let token = state.jwt_service.create_token(&user)?;

    tracing::info!(user_id = user.id, "registered new user");

    let response = AuthResponse {
        token,
        user: UserResponse::from(&user),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password are indistinguishable to the caller.
    let user = state
        .users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !password::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = state.jwt_service.create_token(&user)?;

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .users
        .get_by_id(auth_user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        user_id: user.id,
        name: user.name,
        email: user.email,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }))
}

/// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Routes behind the auth middleware
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/profile", get(profile))
}
