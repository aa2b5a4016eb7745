//! JWT access token generation and validation.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default access token lifetime: 30 minutes
pub const DEFAULT_ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(30 * 60);

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user id as a decimal string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime: Duration,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret and default token lifetime.
    pub fn new(secret: &[u8], access_lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_lifetime,
        }
    }

    /// Lifetime used by [`JwtConfig::issue_access_token`].
    pub fn access_lifetime(&self) -> Duration {
        self.access_lifetime
    }

    /// Issue a token for `subject` that expires `lifetime` from now.
    pub fn issue(&self, subject: i64, lifetime: Duration) -> Result<String, TokenError> {
        let now = unix_now()?;
        let claims = AccessClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(lifetime.as_secs()),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Encoding)
    }

    /// Issue a token with the configured access lifetime.
    pub fn issue_access_token(&self, subject: i64) -> Result<String, TokenError> {
        self.issue(subject, self.access_lifetime)
    }

    /// Validate a token and return its subject.
    ///
    /// The signature is checked before any claim is looked at. A token whose
    /// expiry is at or before the current second is `Expired`; everything else
    /// that fails is `Invalid`.
    pub fn validate(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data =
            jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation).map_err(
                |e| match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid(e.to_string()),
                },
            )?;

        // jsonwebtoken only rejects exp < now; a token is already dead at exp.
        if token_data.claims.exp <= unix_now()? {
            return Err(TokenError::Expired);
        }

        token_data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| TokenError::Invalid("subject is not a user id".into()))
    }
}

fn unix_now() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| TokenError::TimeError)
}

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Error encoding the token
    #[error("failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    /// Token is past its expiry
    #[error("token expired")]
    Expired,
    /// Bad signature, malformed token or missing claims
    #[error("invalid token: {0}")]
    Invalid(String),
    /// System time error
    #[error("system time error")]
    TimeError,
}
