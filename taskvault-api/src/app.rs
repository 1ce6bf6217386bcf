/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskvault_api::{app::{build_router, AppState, Backends}, config::Config};
/// use taskvault_shared::{auth::jwt::TokenIssuer, db::pool::create_pool, storage::s3::S3BlobStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.pool_config()).await?;
/// let blobs = Arc::new(S3BlobStore::new(config.s3.clone()).await?);
/// let state = AppState::new(
///     Backends::postgres(&pool, blobs),
///     Arc::new(TokenIssuer::new(config.token_config())),
///     config.upload_config(),
///     config.request_timeout,
/// )
/// .with_database(pool);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use taskvault_shared::{
    auth::{jwt::TokenIssuer, middleware::create_jwt_middleware},
    models::{file::File, todo::Todo, user::User},
    repository::{postgres::PgRepository, Repository},
    services::{auth::AuthService, setting::SettingService, todo::TodoService},
    storage::BlobStore,
    upload::{UploadConfig, Uploader},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Room left for the JSON framing around the largest data URI
const BODY_FRAMING_BYTES: usize = 64 * 1024;

/// Largest request body that can carry an upload of `max_size` decoded bytes
///
/// Base64 grows the payload by 4/3; the limit still admits a payload just
/// over `max_size` so the upload pipeline reports it as too large.
pub fn body_limit_for(max_size: usize) -> usize {
    max_size.div_ceil(3) * 4 + BODY_FRAMING_BYTES
}

/// Persistence and storage handles the services are built from
#[derive(Clone)]
pub struct Backends {
    pub users: Arc<dyn Repository<User>>,
    pub todos: Arc<dyn Repository<Todo>>,
    pub files: Arc<dyn Repository<File>>,
    pub blobs: Arc<dyn BlobStore>,
}

impl Backends {
    /// PostgreSQL repositories sharing one pool
    pub fn postgres(pool: &PgPool, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            users: Arc::new(PgRepository::<User>::new(pool.clone())),
            todos: Arc::new(PgRepository::<Todo>::new(pool.clone())),
            files: Arc::new(PgRepository::<File>::new(pool.clone())),
            blobs,
        }
    }
}

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub settings: SettingService,
    pub todos: TodoService,

    /// Verifier used by the bearer middleware
    pub tokens: Arc<TokenIssuer>,

    /// Pool checked by `/health`; absent when running without a database
    pub db: Option<PgPool>,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Arc<[String]>,

    /// Request body ceiling in bytes
    pub body_limit: usize,
}

impl AppState {
    /// Wires the orchestrators to their backends
    pub fn new(
        backends: Backends,
        tokens: Arc<TokenIssuer>,
        upload: UploadConfig,
        timeout: Duration,
    ) -> Self {
        let body_limit = body_limit_for(upload.max_size);
        let uploader = Uploader::new(backends.blobs, backends.files.clone(), upload);

        Self {
            auth: AuthService::new(
                backends.users.clone(),
                backends.files,
                tokens.clone(),
                timeout,
            ),
            settings: SettingService::new(backends.users, uploader, timeout),
            todos: TodoService::new(backends.todos, timeout),
            tokens,
            db: None,
            cors_origins: Arc::from(vec!["*".to_string()]),
            body_limit,
        }
    }

    /// Attaches the pool reported by `/health`
    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.db = Some(pool);
        self
    }

    /// Restricts CORS to the given origins
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Arc::from(origins);
        self
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                     # Health check (public)
/// └── /user/
///     ├── /auth/
///     │   ├── POST /register           # public
///     │   ├── POST /login              # public
///     │   └── GET  /profile            # bearer token
///     ├── PUT  /setting/profile        # bearer token
///     └── /todo                        # bearer token
///         ├── GET    /                 # list (page, limit)
///         ├── POST   /                 # create
///         ├── GET    /:id
///         ├── PUT    /:id
///         └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Body limit sized for the largest profile picture
/// 4. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Account creation and login (public)
    let public_routes = Router::new()
        .route("/user/auth/register", post(routes::auth::register))
        .route("/user/auth/login", post(routes::auth::login));

    // Everything else requires a session token
    let protected_routes = Router::new()
        .route("/user/auth/profile", get(routes::auth::profile))
        .route("/user/setting/profile", put(routes::setting::update_profile))
        .route(
            "/user/todo",
            get(routes::todo::list_todos).post(routes::todo::create_todo),
        )
        .route(
            "/user/todo/:id",
            get(routes::todo::get_todo)
                .put(routes::todo::update_todo)
                .delete(routes::todo::delete_todo),
        )
        .route_layer(middleware::from_fn(create_jwt_middleware(
            state.tokens.clone(),
        )));

    let cors = cors_layer(&state.cors_origins);
    let body_limit = DefaultBodyLimit::max(state.body_limit);

    Router::new()
        .merge(health_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .layer(body_limit)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskvault_shared::upload::DEFAULT_MAX_SIZE;

    #[test]
    fn test_body_limit_admits_largest_upload() {
        let limit = body_limit_for(DEFAULT_MAX_SIZE);

        // base64 of DEFAULT_MAX_SIZE + 1 bytes, plus a data URI header
        let oversized = (DEFAULT_MAX_SIZE + 1).div_ceil(3) * 4 + 64;
        assert!(limit > oversized);
    }

    #[test]
    fn test_body_limit_tracks_upload_ceiling() {
        assert!(body_limit_for(2 * DEFAULT_MAX_SIZE) > body_limit_for(DEFAULT_MAX_SIZE));
        assert_eq!(body_limit_for(0), BODY_FRAMING_BYTES);
    }
}
