//! CLI argument parsing, validation, and startup helpers.

use std::time::Duration;

use crate::ServerConfig;
use crate::db::Database;
use crate::password::hash_password;
use clap::Parser;
use rand::{Rng, distr::Alphanumeric};
use tracing::{error, info};

const MIN_JWT_SECRET_LENGTH: usize = 32;
const GENERATED_PASSWORD_LENGTH: usize = 24;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "notekeeper",
    about = "Users and notes REST API with bearer token authentication"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Path to SQLite database file (":memory:" for a throwaway database)
    #[arg(short, long, env = "DATABASE_URL", default_value = "notes.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Access token lifetime in seconds
    #[arg(long, env = "TOKEN_LIFETIME_SECS", default_value = "1800",
        value_parser = clap::value_parser!(u64).range(1..))]
    pub token_lifetime: u64,

    /// Create an admin user with this email on startup. Password is read from
    /// ADMIN_PASSWORD or generated and printed once
    #[arg(long, value_name = "EMAIL")]
    pub create_admin: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    validate_jwt_secret(secret)
}

fn validate_jwt_secret(secret: String) -> Option<String> {
    if secret.chars().count() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Generate a random alphanumeric password for a new admin.
fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

/// Handle the --create-admin flag: create an admin account unless that admin exists.
/// Returns false if startup should abort, including when the email belongs to a
/// regular account.
pub async fn handle_create_admin(db: &Database, email: &str) -> bool {
    match db.users().get_credentials_by_email(email).await {
        Ok(Some(existing)) => {
            return match db.users().get(existing.id).await {
                Ok(Some(user)) if user.is_admin => {
                    info!(user_id = user.id, "Admin already exists, skipping creation");
                    true
                }
                Ok(_) => {
                    error!(
                        user_id = existing.id,
                        "Admin email belongs to a regular account, refusing to start"
                    );
                    false
                }
                Err(e) => {
                    error!(error = %e, "Failed to load existing account");
                    false
                }
            };
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Failed to check for existing admin");
            return false;
        }
    }

    let (password, generated) = match std::env::var("ADMIN_PASSWORD") {
        Ok(password) if !password.is_empty() => {
            // SAFETY: Same as JWT_SECRET, startup is single-threaded.
            unsafe { std::env::remove_var("ADMIN_PASSWORD") };
            (password, false)
        }
        _ => (generate_password(), true),
    };

    let hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "Failed to hash admin password");
            return false;
        }
    };

    match db.users().create_admin(email, &hash).await {
        Ok(created) => {
            info!(user_id = created.id, "Admin user created");
            if generated {
                println!();
                println!("Admin user created: {}", email);
                println!("Password: {}", password);
                println!();
            }
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to create admin user");
            false
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(db: Database, jwt_secret: String, token_lifetime_secs: u64) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        token_lifetime: Duration::from_secs(token_lifetime_secs),
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
