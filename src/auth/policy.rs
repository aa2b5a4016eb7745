//! Authorization gates evaluated after the principal is resolved.

use tracing::warn;

use super::errors::AuthErrorKind;
use super::types::Principal;

/// Pass only for admins. `target_user_id` is the user the request addresses, if any.
pub fn require_admin(
    principal: &Principal,
    target_user_id: Option<i64>,
) -> Result<(), AuthErrorKind> {
    if principal.is_admin {
        return Ok(());
    }
    warn!(
        principal_id = principal.id,
        target_id = target_user_id,
        "Denied non-admin access to an admin-only resource"
    );
    Err(AuthErrorKind::Forbidden)
}

/// Pass when the principal is the target user or an admin.
pub fn require_owner_or_admin(
    principal: &Principal,
    target_user_id: i64,
) -> Result<(), AuthErrorKind> {
    if principal.id == target_user_id || principal.is_admin {
        return Ok(());
    }
    warn!(
        principal_id = principal.id,
        target_id = target_user_id,
        "Denied access to another user's resources"
    );
    Err(AuthErrorKind::Forbidden)
}

/// Parse a user id taken from the request path.
pub fn parse_target_user_id(raw: &str) -> Result<i64, AuthErrorKind> {
    raw.parse::<i64>().map_err(|_| AuthErrorKind::InvalidTarget)
}
