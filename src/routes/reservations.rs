//! Reservation routes
//!
//! Thin booking CRUD. Overlap detection and scheduling rules are out of
//! scope; the database only records the requested time ranges.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::auth::models::AuthUser;
use crate::database::models::Reservation;
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub room_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

pub async fn create_reservation(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.end_time <= payload.start_time {
        return Err(ApiError::BadRequest(
            "'end_time' must be after 'start_time'".to_string(),
        ));
    }

    if state.rooms.get_by_id(payload.room_id).await?.is_none() {
        return Err(ApiError::NotFound("Room not found".to_string()));
    }

    let reservation = state
        .reservations
        .create(
            auth_user.id,
            payload.room_id,
            payload.start_time,
            payload.end_time,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn reservations_by_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    if state.rooms.get_by_id(room_id).await?.is_none() {
        return Err(ApiError::NotFound("Room not found".to_string()));
    }

    Ok(Json(state.reservations.get_by_room(room_id).await?))
}

pub async fn my_reservations(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    Ok(Json(state.reservations.get_by_user(auth_user.id).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reservations", post(create_reservation))
        .route("/reservations/my-reservations", get(my_reservations))
        .route("/reservations/by-room/{room_id}", get(reservations_by_room))
}
