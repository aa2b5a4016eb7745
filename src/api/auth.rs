//! Password login and token introspection.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::error::{ApiError, ResultExt, validate_credentials_input};
use super::run_blocking;
use crate::auth::Auth;
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::password;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

impl_has_auth_backend!(AuthState);

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    user_id: i64,
    access_token: String,
    token_type: &'static str,
}

async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(LoginRequest { email, password }) = payload?;
    validate_credentials_input(&email, &password)?;

    let credentials = state
        .db
        .users()
        .get_credentials_by_email(&email)
        .await
        .db_err("Failed to look up user")?;

    let Some(credentials) = credentials else {
        // Same hashing cost as a real check
        run_blocking(move || password::verify_dummy(&password)).await?;
        info!("Login failed: unknown email");
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    };

    let user_id = credentials.id;
    let stored = credentials.password_hash;

    let (valid, password, stored) = run_blocking(move || {
        let valid = password::verify_password(&password, &stored);
        (valid, password, stored)
    })
    .await?;

    if !valid {
        info!(user_id, "Login failed: wrong password");
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    }

    if password::needs_rehash(&stored) {
        upgrade_hash(&state.db, user_id, password).await;
    }

    let access_token = state
        .jwt
        .issue_access_token(user_id)
        .internal_err("Failed to issue access token")?;

    info!(user_id, "User logged in");

    Ok(Json(LoginResponse {
        user_id,
        access_token,
        token_type: "bearer",
    }))
}

/// Re-hash with the current parameters. Failures keep the old hash.
async fn upgrade_hash(db: &Database, user_id: i64, password: String) {
    let hash = match run_blocking(move || password::hash_password(&password)).await {
        Ok(Ok(hash)) => hash,
        Ok(Err(e)) => {
            warn!(user_id, error = %e, "Failed to re-hash password");
            return;
        }
        Err(_) => return,
    };

    match db.users().update_password_hash(user_id, &hash).await {
        Ok(_) => info!(user_id, "Upgraded password hash"),
        Err(e) => warn!(user_id, error = %e, "Failed to store upgraded password hash"),
    }
}

#[derive(Serialize)]
struct MeResponse {
    message: String,
}

async fn me(auth: Auth) -> impl IntoResponse {
    Json(MeResponse {
        message: format!(
            "your user id is: {} and your token is valid",
            auth.principal.id
        ),
    })
}
