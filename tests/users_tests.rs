mod common;

use axum::http::StatusCode;
use common::create_test_app;
use serde_json::json;

#[tokio::test]
async fn test_signup_duplicate_email() {
    let app = create_test_app().await;
    let body = json!({"email": "a@x.com", "password": "secret"});

    let (status, _) = app.send("POST", "/api/users", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.send("POST", "/api/users", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");
}

#[tokio::test]
async fn test_signup_never_creates_admin() {
    let app = create_test_app().await;

    let (status, body) = app
        .send(
            "POST",
            "/api/users",
            None,
            Some(json!({"email": "a@x.com", "password": "secret", "is_admin": true})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let user = app
        .db
        .users()
        .get(body["id"].as_i64().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(!user.is_admin);
}

#[tokio::test]
async fn test_list_users_requires_admin() {
    let app = create_test_app().await;
    let user_id = app.create_user("a@x.com", "secret").await;
    let admin_id = app.create_admin("root@x.com", "secret").await;

    let (status, _) = app.send("GET", "/api/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send("GET", "/api/users", Some(&app.token_for(user_id)), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    let (status, body) = app
        .send("GET", "/api/users", Some(&app.token_for(admin_id)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_users_pagination() {
    let app = create_test_app().await;
    let admin_id = app.create_admin("root@x.com", "secret").await;
    for i in 0..3 {
        app.create_user(&format!("user{}@x.com", i), "secret").await;
    }
    let token = app.token_for(admin_id);

    let (status, body) = app
        .send("GET", "/api/users?page=2&page_size=3", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app
        .send("GET", "/api/users?page=0", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send("GET", "/api/users?page_size=101", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_user_owner_or_admin() {
    let app = create_test_app().await;
    let alice = app.create_user("alice@x.com", "secret").await;
    let bob = app.create_user("bob@x.com", "secret").await;
    let admin = app.create_admin("root@x.com", "secret").await;

    let (status, body) = app
        .send(
            "GET",
            &format!("/api/users/{}", alice),
            Some(&app.token_for(alice)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], alice);
    assert_eq!(body["email"], "alice@x.com");
    assert_eq!(body["is_admin"], false);
    assert_eq!(body["notes_count"], 0);

    let (status, body) = app
        .send(
            "GET",
            &format!("/api/users/{}", alice),
            Some(&app.token_for(bob)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    let (status, _) = app
        .send(
            "GET",
            &format!("/api/users/{}", alice),
            Some(&app.token_for(admin)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_get_user_leading_zeros_match_owner() {
    let app = create_test_app().await;
    let alice = app.create_user("alice@x.com", "secret").await;

    let (status, _) = app
        .send(
            "GET",
            &format!("/api/users/00{}", alice),
            Some(&app.token_for(alice)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_get_user_invalid_id() {
    let app = create_test_app().await;
    let alice = app.create_user("alice@x.com", "secret").await;

    let (status, body) = app
        .send("GET", "/api/users/abc", Some(&app.token_for(alice)), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid user id");
}

#[tokio::test]
async fn test_get_missing_user_as_admin() {
    let app = create_test_app().await;
    let admin = app.create_admin("root@x.com", "secret").await;

    let (status, body) = app
        .send("GET", "/api/users/9999", Some(&app.token_for(admin)), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User 9999 does not exist");
}

#[tokio::test]
async fn test_unauthenticated_before_forbidden() {
    let app = create_test_app().await;
    let alice = app.create_user("alice@x.com", "secret").await;

    let (status, _) = app
        .send("GET", &format!("/api/users/{}", alice), None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_user_requires_admin() {
    let app = create_test_app().await;
    let alice = app.create_user("alice@x.com", "secret").await;

    let (status, _) = app
        .send(
            "DELETE",
            &format!("/api/users/{}", alice),
            Some(&app.token_for(alice)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.db.users().exists(alice).await.unwrap());
}

#[tokio::test]
async fn test_delete_user_cascades_and_revokes_access() {
    let app = create_test_app().await;
    let alice = app.create_user("alice@x.com", "secret").await;
    let admin = app.create_admin("root@x.com", "secret").await;
    app.db.notes().create(alice, "one", "first").await.unwrap();
    app.db.notes().create(alice, "two", "second").await.unwrap();
    let alice_token = app.token_for(alice);

    let (status, body) = app
        .send(
            "DELETE",
            &format!("/api/users/{}", alice),
            Some(&app.token_for(admin)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        format!(
            "user {} was deleted successfully, along with 2 notes",
            alice
        )
    );

    assert!(app.db.notes().list_by_user(alice).await.unwrap().is_empty());

    let (status, _) = app.send("GET", "/auth/me", Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            "DELETE",
            &format!("/api/users/{}", alice),
            Some(&app.token_for(admin)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user_non_numeric_id_is_json_error() {
    let app = create_test_app().await;
    let admin = app.create_admin("root@x.com", "secret").await;

    let (status, body) = app
        .send("DELETE", "/api/users/abc", Some(&app.token_for(admin)), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid id in path");
}

#[tokio::test]
async fn test_list_users_bad_query_is_json_error() {
    let app = create_test_app().await;
    let admin = app.create_admin("root@x.com", "secret").await;

    let (status, body) = app
        .send("GET", "/api/users?page=abc", Some(&app.token_for(admin)), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid query parameters");
}
