//! User accounts and their notes.
//!
//! Sign-up is open. Listing and deleting accounts is admin-only. Everything
//! under `/{user_id}` is available to that user and to admins.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ResultExt, is_unique_violation, validate_credentials_input};
use super::pagination::Pagination;
use super::run_blocking;
use crate::auth::{AdminOnly, Auth, OwnerOrAdmin};
use crate::db::{CreatedNote, Database};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::password;

const MAX_NOTE_NAME_LENGTH: usize = 200;
const MAX_NOTE_LENGTH: usize = 100_000;

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(UsersState);

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{user_id}", get(get_user).delete(delete_user))
        .route("/{user_id}/notes", get(list_notes).post(create_note))
        .route(
            "/{user_id}/notes/{note_id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .with_state(state)
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

#[derive(Deserialize)]
struct CreateUserRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct CreateUserResponse {
    message: &'static str,
    email: String,
    created: String,
    id: i64,
}

async fn create_user(
    State(state): State<UsersState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(CreateUserRequest { email, password }) = payload?;
    validate_credentials_input(&email, &password)?;

    let password_hash = run_blocking(move || password::hash_password(&password))
        .await?
        .internal_err("Failed to hash password")?;

    let created = match state.db.users().create(&email, &password_hash).await {
        Ok(created) => created,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::bad_request("Email already registered"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to create user", e)),
    };

    info!(user_id = created.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "user created successfully",
            email,
            created: created.created,
            id: created.id,
        }),
    ))
}

async fn list_users(
    State(state): State<UsersState>,
    _auth: Auth<AdminOnly>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(pagination) = pagination?;
    let (offset, limit) = pagination.offset_limit()?;

    let users = state
        .db
        .users()
        .list(offset, limit)
        .await
        .db_err("Failed to list users")?;

    Ok(Json(users))
}

async fn get_user(
    State(state): State<UsersState>,
    auth: OwnerOrAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .get(auth.target_user_id)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| user_not_found(auth.target_user_id))?;

    Ok(Json(user))
}

async fn delete_user(
    State(state): State<UsersState>,
    auth: Auth<AdminOnly>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(user_id) = path?;
    let notes_deleted = state
        .db
        .delete_user_with_notes(user_id)
        .await
        .db_err("Failed to delete user")?
        .ok_or_else(|| user_not_found(user_id))?;

    info!(
        user_id,
        notes_deleted,
        admin_id = auth.principal.id,
        "User deleted"
    );

    Ok(MessageResponse::new(format!(
        "user {} was deleted successfully, along with {} notes",
        user_id, notes_deleted
    )))
}

async fn list_notes(
    State(state): State<UsersState>,
    auth: OwnerOrAdmin,
) -> Result<impl IntoResponse, ApiError> {
    ensure_user_exists(&state.db, auth.target_user_id).await?;

    let notes = state
        .db
        .notes()
        .list_by_user(auth.target_user_id)
        .await
        .db_err("Failed to list notes")?;

    Ok(Json(notes))
}

#[derive(Deserialize)]
struct CreateNoteRequest {
    name: String,
    note: String,
}

#[derive(Serialize)]
struct CreateNoteResponse {
    message: &'static str,
    details: CreatedNote,
}

async fn create_note(
    State(state): State<UsersState>,
    auth: OwnerOrAdmin,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(CreateNoteRequest { name, note }) = payload?;
    validate_note_name(&name)?;
    validate_note_body(&note)?;

    ensure_user_exists(&state.db, auth.target_user_id).await?;

    let details = state
        .db
        .notes()
        .create(auth.target_user_id, &name, &note)
        .await
        .db_err("Failed to create note")?;

    info!(
        user_id = auth.target_user_id,
        note_id = details.id,
        "Note created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateNoteResponse {
            message: "note added successfully",
            details,
        }),
    ))
}

#[derive(Deserialize)]
struct NotePath {
    note_id: i64,
}

async fn get_note(
    State(state): State<UsersState>,
    auth: OwnerOrAdmin,
    path: Result<Path<NotePath>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(NotePath { note_id }) = path?;
    ensure_user_exists(&state.db, auth.target_user_id).await?;

    let note = state
        .db
        .notes()
        .get(auth.target_user_id, note_id)
        .await
        .db_err("Failed to get note")?
        .ok_or_else(|| note_not_found(auth.target_user_id, note_id))?;

    Ok(Json(note))
}

#[derive(Deserialize)]
struct UpdateNoteRequest {
    note: String,
}

async fn update_note(
    State(state): State<UsersState>,
    auth: OwnerOrAdmin,
    path: Result<Path<NotePath>, PathRejection>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(NotePath { note_id }) = path?;
    let Json(UpdateNoteRequest { note }) = payload?;
    validate_note_body(&note)?;

    ensure_user_exists(&state.db, auth.target_user_id).await?;

    let updated = state
        .db
        .notes()
        .update(auth.target_user_id, note_id, &note)
        .await
        .db_err("Failed to update note")?;

    if !updated {
        return Err(note_not_found(auth.target_user_id, note_id));
    }

    Ok(MessageResponse::new(format!(
        "note {} for user {} was updated successfully",
        note_id, auth.target_user_id
    )))
}

async fn delete_note(
    State(state): State<UsersState>,
    auth: OwnerOrAdmin,
    path: Result<Path<NotePath>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(NotePath { note_id }) = path?;
    ensure_user_exists(&state.db, auth.target_user_id).await?;

    let deleted = state
        .db
        .notes()
        .delete(auth.target_user_id, note_id)
        .await
        .db_err("Failed to delete note")?;

    if !deleted {
        return Err(note_not_found(auth.target_user_id, note_id));
    }

    info!(user_id = auth.target_user_id, note_id, "Note deleted");

    Ok(MessageResponse::new(format!(
        "note {} for user {} was deleted successfully",
        note_id, auth.target_user_id
    )))
}

/// Admins pass the ownership gate for any id, so the target may be missing.
async fn ensure_user_exists(db: &Database, user_id: i64) -> Result<(), ApiError> {
    let exists = db
        .users()
        .exists(user_id)
        .await
        .db_err("Failed to check user")?;

    if exists {
        Ok(())
    } else {
        Err(user_not_found(user_id))
    }
}

fn user_not_found(user_id: i64) -> ApiError {
    ApiError::not_found(format!("User {} does not exist", user_id))
}

fn note_not_found(user_id: i64, note_id: i64) -> ApiError {
    ApiError::not_found(format!(
        "Note {} for user {} does not exist",
        note_id, user_id
    ))
}

fn validate_note_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("Note name cannot be empty"));
    }
    if name.chars().count() > MAX_NOTE_NAME_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Note name cannot be longer than {} characters",
            MAX_NOTE_NAME_LENGTH
        )));
    }
    Ok(())
}

fn validate_note_body(note: &str) -> Result<(), ApiError> {
    if note.len() > MAX_NOTE_LENGTH {
        return Err(ApiError::bad_request("Note is too long"));
    }
    Ok(())
}
