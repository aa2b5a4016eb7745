mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::create_test_app;
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;

#[tokio::test]
async fn test_signup_login_me() {
    let app = create_test_app().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/users",
            None,
            Some(json!({"email": "a@x.com", "password": "secret"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "a@x.com");
    let user_id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "a@x.com", "password": "secret"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], user_id);
    assert_eq!(body["token_type"], "bearer");
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = app.send("GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        format!("your user id is: {} and your token is valid", user_id)
    );
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = create_test_app().await;
    app.create_user("a@x.com", "secret").await;

    let (status, body) = app
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "a@x.com", "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_unknown_email_matches_wrong_password() {
    let app = create_test_app().await;

    let (status, body) = app
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "nobody@x.com", "password": "secret"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_email_is_case_sensitive() {
    let app = create_test_app().await;
    app.create_user("a@x.com", "secret").await;

    let (status, _) = app
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "A@X.com", "password": "secret"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_malformed_body() {
    let app = create_test_app().await;

    let (status, body) = app
        .send("POST", "/auth/login", None, Some(json!({"email": "a@x.com"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");

    let (status, _) = app
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "", "password": "secret"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_upgrades_old_hash() {
    use pbkdf2::{
        Algorithm, Params, Pbkdf2,
        password_hash::{PasswordHasher, SaltString},
    };

    let app = create_test_app().await;
    let salt = SaltString::encode_b64(b"0123456789abcdef").unwrap();
    let old_hash = Pbkdf2
        .hash_password_customized(
            b"secret",
            Some(Algorithm::Pbkdf2Sha256.ident()),
            None,
            Params {
                rounds: 1000,
                output_length: 32,
            },
            &salt,
        )
        .unwrap()
        .to_string();
    let user = app.db.users().create("a@x.com", &old_hash).await.unwrap();

    let (status, _) = app
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "a@x.com", "password": "secret"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let creds = app
        .db
        .users()
        .get_credentials_by_email("a@x.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(creds.id, user.id);
    assert_ne!(creds.password_hash, old_hash);
    assert!(!notekeeper::password::needs_rehash(&creds.password_hash));
    assert!(notekeeper::password::verify_password("secret", &creds.password_hash));
}

#[tokio::test]
async fn test_me_without_header() {
    let app = create_test_app().await;

    let response = app
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
}

#[tokio::test]
async fn test_me_malformed_headers() {
    let app = create_test_app().await;
    let user_id = app.create_user("a@x.com", "secret").await;
    let token = app.token_for(user_id);

    for value in [
        format!("Basic {}", token),
        format!("Bearer  {}", token),
        "Bearer".to_string(),
        "Bearer ".to_string(),
        token.clone(),
    ] {
        let response = app
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/auth/me")
                    .header(header::AUTHORIZATION, value.as_str())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "header {:?}",
            value
        );
    }
}

#[tokio::test]
async fn test_me_lowercase_scheme() {
    let app = create_test_app().await;
    let user_id = app.create_user("a@x.com", "secret").await;
    let token = app.token_for(user_id);

    let response = app
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/me")
                .header(header::AUTHORIZATION, format!("bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_me_expired_token() {
    let app = create_test_app().await;
    let user_id = app.create_user("a@x.com", "secret").await;
    let token = app.jwt.issue(user_id, Duration::ZERO).unwrap();

    let (status, body) = app.send("GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authenticated");
}

#[tokio::test]
async fn test_me_token_from_other_secret() {
    let app = create_test_app().await;
    let user_id = app.create_user("a@x.com", "secret").await;
    let other = notekeeper::jwt::JwtConfig::new(
        b"another-secret-that-is-also-long-enough",
        Duration::from_secs(60),
    );
    let token = other.issue_access_token(user_id).unwrap();

    let (status, _) = app.send("GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_tampered_token() {
    let app = create_test_app().await;
    let user_id = app.create_user("a@x.com", "secret").await;
    let mut token = app.token_for(user_id).into_bytes();
    let last = token.len() - 1;
    token[last] = if token[last] == b'A' { b'B' } else { b'A' };
    let token = String::from_utf8(token).unwrap();

    let (status, _) = app.send("GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app().await;

    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], 200);
    assert_eq!(body["message"], "healthy");
}
