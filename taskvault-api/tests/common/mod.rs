/// Common test utilities for integration tests
///
/// Builds the full router over in-memory repositories and an in-memory blob
/// store, and offers a small request helper.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use taskvault_api::app::{build_router, AppState, Backends};
use taskvault_shared::{
    auth::jwt::{TokenConfig, TokenIssuer},
    models::{file::File, todo::Todo, user::User},
    repository::memory::MemoryRepository,
    storage::memory::MemoryBlobStore,
    upload::UploadConfig,
};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing the router and its in-memory backends
pub struct TestContext {
    pub app: Router,
    pub users: Arc<MemoryRepository<User>>,
    pub files: Arc<MemoryRepository<File>>,
    pub store: Arc<MemoryBlobStore>,
    pub tokens: Arc<TokenIssuer>,
}

impl TestContext {
    pub fn new() -> Self {
        let users = Arc::new(MemoryRepository::<User>::new());
        let todos = Arc::new(MemoryRepository::<Todo>::new());
        let files = Arc::new(MemoryRepository::<File>::new());
        let store = Arc::new(MemoryBlobStore::new());
        let tokens = Arc::new(TokenIssuer::new(TokenConfig {
            secret: JWT_SECRET.to_string(),
            ttl_minutes: 60,
        }));

        let backends = Backends {
            users: users.clone(),
            todos,
            files: files.clone(),
            blobs: store.clone(),
        };
        let state = AppState::new(
            backends,
            tokens.clone(),
            UploadConfig::default(),
            Duration::from_secs(10),
        );

        Self {
            app: build_router(state),
            users,
            files,
            store,
            tokens,
        }
    }

    /// Sends a request and returns the status with the decoded JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    /// Sends a prebuilt request
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        (status, body)
    }

    /// Registers and logs in, returning the session token
    pub async fn login_as(&self, name: &str, email: &str, password: &str) -> String {
        let (status, _) = self
            .send(
                Method::POST,
                "/user/auth/register",
                None,
                Some(serde_json::json!({ "name": name, "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .send(
                Method::POST,
                "/user/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        body["data"]["token"].as_str().unwrap().to_string()
    }
}
