#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use notekeeper::{ServerConfig, create_app, db::Database, jwt::JwtConfig, password};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

pub const JWT_SECRET: &[u8] = b"test-jwt-secret-that-is-long-enough!";
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(1800);

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub jwt: JwtConfig,
}

pub async fn create_test_app() -> TestApp {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: JWT_SECRET.to_vec(),
        token_lifetime: TOKEN_LIFETIME,
    };
    TestApp {
        app: create_app(&config),
        db,
        jwt: JwtConfig::new(JWT_SECRET, TOKEN_LIFETIME),
    }
}

impl TestApp {
    /// Send a request and return the status and parsed JSON body (Null when empty or not JSON).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    /// Create a regular user directly in the store. Returns the user id.
    pub async fn create_user(&self, email: &str, password: &str) -> i64 {
        let hash = password::hash_password(password).unwrap();
        self.db.users().create(email, &hash).await.unwrap().id
    }

    /// Create an admin directly in the store. Returns the user id.
    pub async fn create_admin(&self, email: &str, password: &str) -> i64 {
        let hash = password::hash_password(password).unwrap();
        self.db.users().create_admin(email, &hash).await.unwrap().id
    }

    /// Issue a valid access token without going through login.
    pub fn token_for(&self, user_id: i64) -> String {
        self.jwt.issue_access_token(user_id).unwrap()
    }
}
