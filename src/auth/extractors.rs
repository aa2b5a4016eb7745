//! Axum extractors for authentication and authorization.
//!
//! Each extractor resolves the bearer token first and applies its gate second,
//! so a handler body only runs for requests that passed both.

use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, RawPathParams},
    http::request::Parts,
};
use tracing::error;

use super::errors::{ApiAuthError, AuthErrorKind};
use super::header::authorization_header;
use super::policy::{parse_target_user_id, require_admin, require_owner_or_admin};
use super::resolver::resolve;
use super::state::HasAuthBackend;
use super::types::Principal;

/// Name of the path parameter holding the target user id.
pub const USER_ID_PARAM: &str = "user_id";

/// A gate applied to the resolved principal. `target_user_id` is the `user_id`
/// path parameter when the route has one and it parses.
pub trait RoleConstraint: Send + Sync + 'static {
    fn check(principal: &Principal, target_user_id: Option<i64>) -> Result<(), AuthErrorKind>;
}

/// Any authenticated user.
pub struct AnyRole;

impl RoleConstraint for AnyRole {
    fn check(_principal: &Principal, _target_user_id: Option<i64>) -> Result<(), AuthErrorKind> {
        Ok(())
    }
}

/// Admins only.
pub struct AdminOnly;

impl RoleConstraint for AdminOnly {
    fn check(principal: &Principal, target_user_id: Option<i64>) -> Result<(), AuthErrorKind> {
        require_admin(principal, target_user_id)
    }
}

/// Extractor for endpoints that require an authenticated user passing `R`.
pub struct Auth<R: RoleConstraint = AnyRole> {
    pub principal: Principal,
    role: PhantomData<R>,
}

impl<S, R> FromRequestParts<S> for Auth<R>
where
    S: HasAuthBackend + Send + Sync,
    R: RoleConstraint,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = resolve(
            authorization_header(&parts.headers),
            state.jwt(),
            state.db(),
        )
        .await?;

        let target_user_id = user_id_param(parts, state)
            .await
            .and_then(|raw| parse_target_user_id(&raw).ok());
        R::check(&principal, target_user_id)?;

        Ok(Self {
            principal,
            role: PhantomData,
        })
    }
}

/// Extractor for `/{user_id}/...` routes: the caller must be that user or an admin.
pub struct OwnerOrAdmin {
    pub principal: Principal,
    /// User id from the path, already parsed
    pub target_user_id: i64,
}

impl<S> FromRequestParts<S> for OwnerOrAdmin
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth { principal, .. } = Auth::<AnyRole>::from_request_parts(parts, state).await?;

        let raw = user_id_param(parts, state).await.ok_or_else(|| {
            error!("Owner-or-admin route has no {} parameter", USER_ID_PARAM);
            ApiAuthError::from(AuthErrorKind::InvalidTarget)
        })?;

        let target_user_id = parse_target_user_id(&raw)?;
        require_owner_or_admin(&principal, target_user_id)?;

        Ok(Self {
            principal,
            target_user_id,
        })
    }
}

/// Raw `user_id` path parameter, if the matched route has one.
async fn user_id_param<S>(parts: &mut Parts, state: &S) -> Option<String>
where
    S: Send + Sync,
{
    let params = RawPathParams::from_request_parts(parts, state).await.ok()?;
    find_user_id(params.iter()).map(str::to_owned)
}

fn find_user_id<'a>(mut params: impl Iterator<Item = (&'a str, &'a str)>) -> Option<&'a str> {
    params
        .find(|(key, _)| *key == USER_ID_PARAM)
        .map(|(_, value)| value)
}
