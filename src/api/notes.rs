//! Admin view over all notes.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use super::pagination::Pagination;
use crate::auth::{AdminOnly, Auth};
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct NotesState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(NotesState);

pub fn router(state: NotesState) -> Router {
    Router::new().route("/", get(list_notes)).with_state(state)
}

/// List every user's notes, newest first.
async fn list_notes(
    State(state): State<NotesState>,
    _auth: Auth<AdminOnly>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(pagination) = pagination?;
    let (offset, limit) = pagination.offset_limit()?;

    let notes = state
        .db
        .notes()
        .list_all(offset, limit)
        .await
        .db_err("Failed to list notes")?;

    Ok(Json(notes))
}
