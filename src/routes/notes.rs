//! Note routes
//!
//! Membership gates all note access; only the author may mutate or delete.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth::models::AuthUser;
use crate::database::models::Note;
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub room_id: i64,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: String,
}

pub async fn create_note(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let title = payload.title.trim();
    if title.is_empty() || payload.content.is_empty() || payload.room_id <= 0 {
        return Err(ApiError::BadRequest(
            "Fields 'title', 'content', and 'room_id' are required".to_string(),
        ));
    }

    // Membership doubles as an existence check: a nonexistent room has no
    // members.
    if !state.rooms.is_member(auth_user.id, payload.room_id).await? {
        return Err(ApiError::Forbidden(
            "User is not a member of this room".to_string(),
        ));
    }

    let note = state
        .notes
        .create(auth_user.id, payload.room_id, title, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn get_note(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(note_id): Path<i64>,
) -> Result<Json<Note>, ApiError> {
    let note = state
        .notes
        .get_by_id(note_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    if !state.rooms.is_member(auth_user.id, note.room_id).await? {
        return Err(ApiError::Forbidden(
            "User is not a member of this room".to_string(),
        ));
    }

    Ok(Json(note))
}

pub async fn update_note(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(note_id): Path<i64>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .notes
        .get_by_id(note_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    if note.user_id != auth_user.id {
        return Err(ApiError::Forbidden(
            "Only note creator can update the note".to_string(),
        ));
    }

    let title = payload.title.trim();
    if title.is_empty() || payload.content.is_empty() {
        return Err(ApiError::BadRequest(
            "Fields 'title' and 'content' are required".to_string(),
        ));
    }

    state.notes.update(note_id, title, &payload.content).await?;

    Ok(Json(json!({ "message": "Note updated successfully" })))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(note_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .notes
        .get_by_id(note_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    if note.user_id != auth_user.id {
        return Err(ApiError::Forbidden(
            "Only note creator can delete the note".to_string(),
        ));
    }

    state.notes.delete(note_id).await?;

    Ok(Json(json!({ "message": "Note deleted successfully" })))
}

pub async fn notes_by_room(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(room_id): Path<i64>,
) -> Result<Json<Vec<Note>>, ApiError> {
    if !state.rooms.is_member(auth_user.id, room_id).await? {
        return Err(ApiError::Forbidden(
            "User is not a member of this room".to_string(),
        ));
    }

    Ok(Json(state.notes.get_by_room(room_id).await?))
}

pub async fn my_notes(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.notes.get_by_user(auth_user.id).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notes", axum::routing::post(create_note))
        .route("/notes/my-notes", get(my_notes))
        .route("/notes/room/{room_id}", get(notes_by_room))
        .route(
            "/notes/{note_id}",
            get(get_note).put(update_note).delete(delete_note),
        )
}
