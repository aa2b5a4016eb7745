//! Bearer token to principal resolution.
//!
//! Every authenticated endpoint goes through [`resolve`]. It fails closed: any
//! problem with the header, the token or the user row rejects the request.

use tracing::{error, info};

use super::errors::{AuthErrorKind, UnauthorizedReason};
use super::header::parse_bearer;
use super::types::Principal;
use crate::db::Database;
use crate::jwt::{JwtConfig, TokenError};

/// Resolve the raw Authorization header value into the requesting user.
pub async fn resolve(
    raw_header: Option<&str>,
    jwt: &JwtConfig,
    db: &Database,
) -> Result<Principal, AuthErrorKind> {
    let token = raw_header
        .and_then(parse_bearer)
        .ok_or(AuthErrorKind::MissingOrMalformedHeader)?;

    let user_id = jwt.validate(token).map_err(|e| {
        let reason = match e {
            TokenError::Expired => UnauthorizedReason::ExpiredToken,
            _ => UnauthorizedReason::InvalidToken,
        };
        info!(reason = reason.as_str(), error = %e, "Rejected access token");
        AuthErrorKind::Unauthorized(reason)
    })?;

    let user = db
        .users()
        .get(user_id)
        .await
        .map_err(|e| {
            error!(user_id, error = %e, "Failed to load user for token");
            AuthErrorKind::StoreUnavailable
        })?
        .ok_or_else(|| {
            info!(user_id, "Valid token for a user that no longer exists");
            AuthErrorKind::Unauthorized(UnauthorizedReason::UserNotFound)
        })?;

    Ok(Principal::from(user))
}
