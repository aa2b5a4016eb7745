//! Password hashing and verification.
//!
//! New hashes use PBKDF2-HMAC-SHA256 in PHC string format:
//! `$pbkdf2-sha256$i=260000,l=32$<salt>$<hash>`. Verification dispatches on the
//! scheme tag and reads the parameters from the stored string, so hashes written
//! with older iteration counts keep verifying.
//!
//! Hashes written by the previous Python service use the passlib layout
//! `$pbkdf2-sha256$<rounds>$<salt>$<digest>` with "adapted" base64 (`.` instead
//! of `+`). Those are accepted as well and reported by [`needs_rehash`].

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Algorithm, Params, Pbkdf2};
use rand::RngCore;
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;

/// PBKDF2 iteration count for new hashes.
pub const PBKDF2_ROUNDS: u32 = 260_000;

/// Derived key length in bytes.
pub const OUTPUT_LENGTH: usize = 32;

/// Salt length in bytes.
const SALT_LENGTH: usize = 16;

/// Scheme tag of the current hashing scheme.
pub const CURRENT_SCHEME: &str = "pbkdf2-sha256";

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// Hash a password with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    hash_with_params(
        plain,
        Params {
            rounds: PBKDF2_ROUNDS,
            output_length: OUTPUT_LENGTH,
        },
    )
}

fn hash_with_params(plain: &str, params: Params) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; SALT_LENGTH];
    rand::rng().fill_bytes(&mut salt_bytes);

    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Hash(e.to_string()))?;

    Pbkdf2
        .hash_password_customized(
            plain.as_bytes(),
            Some(Algorithm::Pbkdf2Sha256.ident()),
            None,
            params,
            &salt,
        )
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a password against a stored hash.
///
/// Returns false for any malformed or unknown hash string.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    match split_scheme(stored) {
        Some(("pbkdf2-sha256" | "pbkdf2-sha512", rest)) if is_legacy_layout(rest) => {
            verify_legacy(plain, stored)
        }
        Some(("pbkdf2-sha256" | "pbkdf2-sha512", _)) => verify_phc(plain, stored),
        _ => false,
    }
}

/// Whether a stored hash should be replaced by a fresh one in the current scheme.
pub fn needs_rehash(stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return true;
    };
    if parsed.algorithm.as_str() != CURRENT_SCHEME {
        return true;
    }
    let rounds = parsed.params.get_decimal("i");
    let length = parsed.params.get_decimal("l");
    rounds != Some(PBKDF2_ROUNDS) || length != Some(OUTPUT_LENGTH as u32)
}

static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("notekeeper-dummy-password").unwrap_or_default());

/// Run a full verification against a throwaway hash.
///
/// Used when no account matches a login so that unknown emails cost the same
/// as wrong passwords.
pub fn verify_dummy(plain: &str) -> bool {
    verify_password(plain, &DUMMY_HASH);
    false
}

/// Split `$scheme$rest` into `(scheme, rest)`.
fn split_scheme(stored: &str) -> Option<(&str, &str)> {
    let body = stored.strip_prefix('$')?;
    body.split_once('$')
}

/// Legacy strings carry a bare round count where PHC has `i=...,l=...`.
fn is_legacy_layout(rest: &str) -> bool {
    rest.split('$')
        .next()
        .is_some_and(|rounds| !rounds.is_empty() && rounds.bytes().all(|b| b.is_ascii_digit()))
}

fn verify_phc(plain: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    if parsed.params.get_decimal("i") == Some(0) {
        return false;
    }
    Pbkdf2.verify_password(plain.as_bytes(), &parsed).is_ok()
}

fn verify_legacy(plain: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    let ["", scheme, rounds, salt, digest] = parts.as_slice() else {
        return false;
    };

    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    if rounds == 0 {
        return false;
    }
    let (Some(salt), Some(expected)) = (decode_ab64(salt), decode_ab64(digest)) else {
        return false;
    };
    if expected.is_empty() {
        return false;
    }

    let mut computed = vec![0u8; expected.len()];
    match *scheme {
        "pbkdf2-sha256" => {
            pbkdf2::pbkdf2_hmac::<Sha256>(plain.as_bytes(), &salt, rounds, &mut computed)
        }
        "pbkdf2-sha512" => {
            pbkdf2::pbkdf2_hmac::<Sha512>(plain.as_bytes(), &salt, rounds, &mut computed)
        }
        _ => return false,
    }

    computed.ct_eq(&expected).into()
}

/// Decode passlib's adapted base64 (`.` in place of `+`, no padding).
fn decode_ab64(value: &str) -> Option<Vec<u8>> {
    STANDARD_NO_PAD.decode(value.replace('.', "+")).ok()
}
