mod auth;
mod error;
mod health;
mod notes;
mod pagination;
mod users;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::JwtConfig;

pub use error::ApiError;

/// Create the router for `/auth`, `/api` and `/health`.
pub fn create_api_router(db: Database, jwt: Arc<JwtConfig>) -> Router {
    let auth_state = auth::AuthState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let users_state = users::UsersState {
        db: db.clone(),
        jwt: jwt.clone(),
    };

    let notes_state = notes::NotesState {
        db: db.clone(),
        jwt,
    };

    Router::new()
        .nest("/auth", auth::router(auth_state))
        .nest("/api/users", users::router(users_state))
        .nest("/api/notes", notes::router(notes_state))
        .nest("/health", health::router(db))
}

/// Run CPU-heavy work (password hashing) off the async worker threads.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    use error::ResultExt;

    tokio::task::spawn_blocking(f)
        .await
        .internal_err("Blocking task failed")
}
