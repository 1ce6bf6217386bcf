/// HTTP-level tests for the TaskVault API
///
/// These drive the full router (middleware, extractors, handlers and
/// services) over in-memory backends:
/// - Account lifecycle (register → login → profile → settings)
/// - Todo CRUD and ownership
/// - Bearer-token rejections
/// - Body binding errors

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration as ChronoDuration, Utc};
use common::TestContext;
use serde_json::json;
use taskvault_shared::auth::jwt::{TokenConfig, TokenIssuer};
use taskvault_shared::upload::DEFAULT_MAX_SIZE;
use uuid::Uuid;

fn zeroed_png_data_uri(len: usize) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(vec![0u8; len]))
}

fn png_data_uri() -> String {
    let png: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "not_configured");
}

#[tokio::test]
async fn test_account_and_todo_scenario() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/user/auth/register",
            None,
            Some(json!({ "name": "Alice", "email": "a@x.com", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "user successfully registered");
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = ctx
        .send(
            Method::POST,
            "/user/auth/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "login success");
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .send(Method::POST, "/user/todo", Some(&token), Some(json!({ "name": "Buy milk" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "NotStarted");
    let todo_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx.send(Method::GET, "/user/todo", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["limit"], 10);
    assert_eq!(body["data"][0]["name"], "Buy milk");

    let uri = format!("/user/todo/{}", todo_id);
    let (status, body) = ctx
        .send(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({ "name": "Buy milk", "status": "Done" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Done");

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "todo successfully deleted");

    let (status, body) = ctx.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(body["message"], "todo not found");
}

#[tokio::test]
async fn test_duplicate_registration() {
    let ctx = TestContext::new();
    let payload = json!({ "name": "Alice", "email": "a@x.com", "password": "pw" });

    ctx.send(Method::POST, "/user/auth/register", None, Some(payload.clone()))
        .await;
    let (status, body) = ctx
        .send(Method::POST, "/user/auth/register", None, Some(payload))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "email already exist");
}

#[tokio::test]
async fn test_register_validation_envelope() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/user/auth/register",
            None,
            Some(json!({ "email": "not-an-email", "password": "hunter2" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Error Validation");
    let fields: Vec<&str> = body["validation"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "name"]);
    assert!(!body.to_string().contains("hunter2"));
}

#[tokio::test]
async fn test_invalid_json_body() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/user/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = ctx.send_request(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(body["message"], "invalid json data");
}

#[tokio::test]
async fn test_login_errors() {
    let ctx = TestContext::new();
    ctx.login_as("Alice", "a@x.com", "pw").await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/user/auth/login",
            None,
            Some(json!({ "email": "b@x.com", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "email not found");

    let (status, body) = ctx
        .send(
            Method::POST,
            "/user/auth/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "wrong password");
}

#[tokio::test]
async fn test_bearer_rejections() {
    let ctx = TestContext::new();
    let token = ctx.login_as("Alice", "a@x.com", "pw").await;

    let (status, body) = ctx.send(Method::GET, "/user/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert_eq!(body["message"], "Unauthorized: Missing Authorization header");

    let request = Request::builder()
        .uri("/user/todo")
        .header(header::AUTHORIZATION, format!("Token {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = ctx.send_request(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized: Invalid token format");

    let claim = ctx.tokens.verify(&token).unwrap();
    let foreign_issuer = TokenIssuer::new(TokenConfig {
        secret: "some-other-secret-that-is-also-32-bytes".to_string(),
        ttl_minutes: 60,
    });
    let forged = foreign_issuer.issue(claim.user_id, &claim.email).unwrap();
    let (status, body) = ctx.send(Method::GET, "/user/todo", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized: Invalid token signature");

    let expired = ctx
        .tokens
        .issue_at(claim.user_id, &claim.email, Utc::now() - ChronoDuration::hours(3))
        .unwrap();
    let (status, body) = ctx.send(Method::GET, "/user/todo", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized: Token expired");

    let (status, body) = ctx
        .send(Method::GET, "/user/todo", Some("not.a.token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized: Invalid token claims");
}

#[tokio::test]
async fn test_todos_are_private() {
    let ctx = TestContext::new();
    let alice = ctx.login_as("Alice", "a@x.com", "pw").await;
    let bob = ctx.login_as("Bob", "b@x.com", "pw").await;

    let (_, body) = ctx
        .send(Method::POST, "/user/todo", Some(&alice), Some(json!({ "name": "secret" })))
        .await;
    let uri = format!("/user/todo/{}", body["data"]["id"].as_str().unwrap());

    let (status, foreign) = ctx.send(Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = format!("/user/todo/{}", Uuid::new_v4());
    let (_, absent) = ctx.send(Method::GET, &missing, Some(&bob), None).await;
    assert_eq!(foreign, absent);

    let (status, _) = ctx.send(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = ctx.send(Method::GET, "/user/todo", Some(&bob), None).await;
    assert_eq!(body["meta"]["total"], 0);
    assert_eq!(body["data"], json!([]));

    let (status, _) = ctx.send(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_todo_list_paging_query() {
    let ctx = TestContext::new();
    let token = ctx.login_as("Alice", "a@x.com", "pw").await;

    for i in 0..3 {
        ctx.send(
            Method::POST,
            "/user/todo",
            Some(&token),
            Some(json!({ "name": format!("todo {}", i) })),
        )
        .await;
    }

    let (_, body) = ctx
        .send(Method::GET, "/user/todo?page=2&limit=2", Some(&token), None)
        .await;
    assert_eq!(body["meta"], json!({ "page": 2, "limit": 2, "total": 3 }));
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "todo 2");

    let (_, body) = ctx
        .send(Method::GET, "/user/todo?page=abc&limit=-5", Some(&token), None)
        .await;
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["limit"], 10);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_todo_rejects_unknown_status() {
    let ctx = TestContext::new();
    let token = ctx.login_as("Alice", "a@x.com", "pw").await;
    let (_, body) = ctx
        .send(Method::POST, "/user/todo", Some(&token), Some(json!({ "name": "x" })))
        .await;
    let uri = format!("/user/todo/{}", body["data"]["id"].as_str().unwrap());

    let (status, body) = ctx
        .send(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({ "name": "x", "status": "Finished" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["validation"][0]["field"], "status");
    assert_eq!(body["validation"][0]["tag"], "todo_status");
    assert_eq!(body["validation"][0]["value"], "Finished");
}

#[tokio::test]
async fn test_update_profile_flow() {
    let ctx = TestContext::new();
    let token = ctx.login_as("Alice", "a@x.com", "pw").await;

    let (status, body) = ctx
        .send(
            Method::PUT,
            "/user/setting/profile",
            Some(&token),
            Some(json!({ "name": "Alice Cooper", "profile_picture": png_data_uri() })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alice Cooper");

    let keys = ctx.store.keys().await;
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("profile_pictures/"));
    assert!(keys[0].ends_with("_Alice.png"));
    assert_eq!(ctx.files.rows().await.len(), 1);

    let (status, body) = ctx.send(Method::GET, "/user/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alice Cooper");
    assert_eq!(body["data"]["avatar"]["mime_type"], "image/png");
    assert_eq!(body["data"]["avatar"]["url"], format!("memory://{}", keys[0]));
}

#[tokio::test]
async fn test_update_profile_rejects_unsupported_upload() {
    let ctx = TestContext::new();
    let token = ctx.login_as("Alice", "a@x.com", "pw").await;

    let (status, body) = ctx
        .send(
            Method::PUT,
            "/user/setting/profile",
            Some(&token),
            Some(json!({ "name": "Bob", "profile_picture": "data:application/zip;base64,UEsDBA==" })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], 500);
    assert!(ctx.store.keys().await.is_empty());
    assert_eq!(ctx.users.rows().await[0].name, "Alice");
}

#[tokio::test]
async fn test_update_profile_accepts_multi_megabyte_photo() {
    let ctx = TestContext::new();
    let token = ctx.login_as("Alice", "a@x.com", "pw").await;

    let (status, body) = ctx
        .send(
            Method::PUT,
            "/user/setting/profile",
            Some(&token),
            Some(json!({ "name": "Alice", "profile_picture": zeroed_png_data_uri(3 * 1024 * 1024) })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    let files = ctx.files.rows().await;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].size, 3 * 1024 * 1024);
}

#[tokio::test]
async fn test_update_profile_reports_oversized_photo() {
    let ctx = TestContext::new();
    let token = ctx.login_as("Alice", "a@x.com", "pw").await;

    let (status, body) = ctx
        .send(
            Method::PUT,
            "/user/setting/profile",
            Some(&token),
            Some(json!({ "name": "Alice", "profile_picture": zeroed_png_data_uri(DEFAULT_MAX_SIZE + 1) })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["message"],
        format!(
            "File too large: {} bytes exceeds {} bytes",
            DEFAULT_MAX_SIZE + 1,
            DEFAULT_MAX_SIZE
        )
    );
    assert!(ctx.store.keys().await.is_empty());
}

#[tokio::test]
async fn test_register_empty_email_single_issue() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/user/auth/register",
            None,
            Some(json!({ "name": "A", "email": "", "password": "pw" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["validation"],
        json!([{ "field": "email", "tag": "required", "value": "" }])
    );
}
