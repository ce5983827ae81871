//! User management routes

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::password;
use crate::database::models::User;
use crate::error::ApiError;
use crate::routes::is_valid_email;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Deserialize)]
pub struct UserLookupQuery {
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct EmailLookupQuery {
    pub email: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
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

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// `GET /users?user_id=N` fetches one user; without the query it lists all.
pub async fn get_users(
    State(state): State<AppState>,
    Query(query): Query<UserLookupQuery>,
) -> Result<impl IntoResponse, ApiError> {
    match query.user_id {
        Some(user_id) => {
            let user = state
                .users
                .get_by_id(user_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
            Ok(Json(UserResponse::from(&user)).into_response())
        }
        None => {
            let users = state.users.get_all().await?;
            let response = UserListResponse {
                users: users.iter().map(UserResponse::from).collect(),
            };
            Ok(Json(response).into_response())
        }
    }
}

pub async fn get_user_by_email(
    State(state): State<AppState>,
    Query(query): Query<EmailLookupQuery>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .get_by_email(&query.email.trim().to_lowercase())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse::from(&user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if payload.name.is_none() && payload.email.is_none() && payload.password.is_none() {
        return Err(ApiError::BadRequest(
            "At least one of 'name', 'email', 'password' must be provided".to_string(),
        ));
    }

    let mut user = state
        .users
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if let Some(email) = payload.email {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(ApiError::BadRequest("Invalid email".to_string()));
        }
        if let Some(existing) = state.users.get_by_email(&email).await? {
            if existing.id != user.id {
                return Err(ApiError::Conflict(
                    "Email already in use by another user".to_string(),
                ));
            }
        }
        user.email = email;
    }

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::BadRequest("Name must not be empty".to_string()));
        }
        user.name = name.trim().to_string();
    }

    if let Some(new_password) = payload.password {
        user.password_hash = password::hash_password(&new_password)?;
    }

    state
        .users
        .update(user.id, &user.name, &user.email, &user.password_hash)
        .await
        .map_err(|e| ApiError::or_conflict(e, "Email already in use by another user"))?;

    Ok(Json(UserResponse::from(&user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.users.delete(user_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(get_users).post(create_user))
        .route("/users/by-email", get(get_user_by_email))
        .route("/users/{user_id}", axum::routing::put(update_user).delete(delete_user))
}
