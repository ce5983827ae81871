//! Room and membership routes
//!
//! Room-level authorization lives here: only the creator may mutate or
//! delete a room, and joining is guarded against duplicates and capacity.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::models::AuthUser;
use crate::database::models::{Note, Room, RoomMember};
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub subject: String,
    #[serde(default)]
    pub capacity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub subject: String,
    #[serde(default)]
    pub capacity: i32,
}

/// Room with its members and notes, returned by the detail endpoint
#[derive(Debug, Serialize)]
pub struct RoomDetailResponse {
    #[serde(flatten)]
    pub room: Room,
    pub members: Vec<RoomMember>,
    pub notes: Vec<Note>,
}

pub async fn create_room(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = payload.name.trim();
    let subject = payload.subject.trim();
    if name.is_empty() || subject.is_empty() {
        return Err(ApiError::BadRequest(
            "Fields 'name' and 'subject' are required".to_string(),
        ));
    }
    if payload.capacity < 0 {
        return Err(ApiError::BadRequest(
            "Capacity must not be negative".to_string(),
        ));
    }

    let room = state
        .rooms
        .create(
            name,
            payload.description.trim(),
            subject,
            payload.capacity,
            auth_user.id,
        )
        .await?;

    // The creator is a member from the start, with the admin role.
    state.rooms.join(auth_user.id, room.id, "admin").await?;

    tracing::info!(room_id = room.id, user_id = auth_user.id, "room created");

    Ok((StatusCode::CREATED, Json(room)))
}

#[derive(Debug, Default, Deserialize)]
pub struct RoomListQuery {
    pub name: Option<String>,
}

/// `GET /rooms` lists all rooms; `?name=` narrows to the room with that name.
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomListQuery>,
) -> Result<Json<Vec<Room>>, ApiError> {
    match query.name {
        Some(name) => {
            let room = state
                .rooms
                .get_by_name(name.trim())
                .await?
                .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;
            Ok(Json(vec![room]))
        }
        None => Ok(Json(state.rooms.get_all().await?)),
    }
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomDetailResponse>, ApiError> {
    let room = state
        .rooms
        .get_by_id(room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    let members = state.rooms.members(room_id).await?;
    let notes = state.notes.get_by_room(room_id).await?;

    Ok(Json(RoomDetailResponse {
        room,
        members,
        notes,
    }))
}

pub async fn update_room(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(room_id): Path<i64>,
    Json(payload): Json<UpdateRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let room = state
        .rooms
        .get_by_id(room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    if room.created_by != auth_user.id {
        return Err(ApiError::Forbidden(
            "Only room creator can update the room".to_string(),
        ));
    }

    let name = payload.name.trim();
    let subject = payload.subject.trim();
    if name.is_empty() || subject.is_empty() {
        return Err(ApiError::BadRequest(
            "Fields 'name' and 'subject' are required".to_string(),
        ));
    }
    if payload.capacity < 0 {
        return Err(ApiError::BadRequest(
            "Capacity must not be negative".to_string(),
        ));
    }

    state
        .rooms
        .update(
            room_id,
            name,
            payload.description.trim(),
            subject,
            payload.capacity,
        )
        .await?;

    Ok(Json(json!({ "message": "Room updated successfully" })))
}

pub async fn delete_room(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(room_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let room = state
        .rooms
        .get_by_id(room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    if room.created_by != auth_user.id {
        return Err(ApiError::Forbidden(
            "Only room creator can delete the room".to_string(),
        ));
    }

    state.rooms.delete(room_id).await?;

    Ok(Json(json!({ "message": "Room deleted successfully" })))
}

pub async fn join_room(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(room_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let room = state
        .rooms
        .get_by_id(room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Room not found".to_string()))?;

    if state.rooms.is_member(auth_user.id, room_id).await? {
        return Err(ApiError::Conflict("User already in room".to_string()));
    }

    // Capacity 0 means unlimited.
    if room.capacity > 0 {
        let count = state.rooms.member_count(room_id).await?;
        if count >= room.capacity as i64 {
            return Err(ApiError::Conflict("Room is full".to_string()));
        }
    }

    state
        .rooms
        .join(auth_user.id, room_id, "member")
        .await
        .map_err(|e| ApiError::or_conflict(e, "User already in room"))?;

    Ok(Json(json!({ "message": "Joined room successfully" })))
}

pub async fn leave_room(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(room_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state.rooms.leave(auth_user.id, room_id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound("User not in room".to_string()));
    }

    Ok(Json(json!({ "message": "Left room successfully" })))
}

pub async fn my_rooms(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Vec<Room>>, ApiError> {
    Ok(Json(state.rooms.rooms_for_user(auth_user.id).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(create_room).get(list_rooms))
        .route("/rooms/my-rooms", get(my_rooms))
        .route(
            "/rooms/{room_id}",
            get(get_room).put(update_room).delete(delete_room),
        )
        .route("/rooms/{room_id}/join", post(join_room))
        .route("/rooms/{room_id}/leave", delete(leave_room))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults_optional_fields() {
        let req: CreateRoomRequest =
            serde_json::from_str(r#"{"name": "Algebra", "subject": "math"}"#).unwrap();
        assert_eq!(req.description, "");
        assert_eq!(req.capacity, 0);
    }

    #[test]
    fn create_request_requires_name_and_subject() {
        assert!(serde_json::from_str::<CreateRoomRequest>(r#"{"subject": "math"}"#).is_err());
        assert!(serde_json::from_str::<CreateRoomRequest>(r#"{"name": "Algebra"}"#).is_err());
    }
}
