//! Authentication error types.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Why a request could not be authenticated. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedReason {
    ExpiredToken,
    InvalidToken,
    UserNotFound,
}

impl UnauthorizedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExpiredToken => "token expired",
            Self::InvalidToken => "token invalid",
            Self::UserNotFound => "user not found",
        }
    }
}

/// Internal auth error kind used by the resolver and the policy gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    MissingOrMalformedHeader,
    Unauthorized(UnauthorizedReason),
    Forbidden,
    /// The path carried a user id that is not an integer.
    InvalidTarget,
    StoreUnavailable,
}

/// API authentication errors. Response bodies never carry the internal reason.
#[derive(Debug)]
pub struct ApiAuthError {
    pub(super) kind: AuthErrorKind,
}

impl ApiAuthError {
    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    fn status_code(&self) -> StatusCode {
        match self.kind {
            AuthErrorKind::MissingOrMalformedHeader | AuthErrorKind::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthErrorKind::Forbidden => StatusCode::FORBIDDEN,
            AuthErrorKind::InvalidTarget => StatusCode::BAD_REQUEST,
            AuthErrorKind::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self.kind {
            AuthErrorKind::MissingOrMalformedHeader | AuthErrorKind::Unauthorized(_) => {
                "Not authenticated"
            }
            AuthErrorKind::Forbidden => "Forbidden",
            AuthErrorKind::InvalidTarget => "Invalid user id",
            AuthErrorKind::StoreUnavailable => "Internal server error",
        }
    }
}

impl From<AuthErrorKind> for ApiAuthError {
    fn from(kind: AuthErrorKind) -> Self {
        Self { kind }
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        let status = self.status_code();
        let mut response = (
            status,
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}
