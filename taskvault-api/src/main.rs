//! # TaskVault API Server
//!
//! Multi-user account service: registration, login, profile settings with
//! profile pictures on S3, and per-user todo lists.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskvault-api
//! ```

use std::sync::Arc;
use taskvault_api::{
    app::{build_router, AppState, Backends},
    config::{Config, LogFormat},
};
use taskvault_shared::{
    auth::jwt::TokenIssuer,
    db::{
        migrations::{ensure_database_exists, get_migration_status, run_migrations},
        pool::{close_pool, create_pool, get_pool_stats},
    },
    storage::s3::S3BlobStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskvault_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        "TaskVault API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    ensure_database_exists(&config.database.url).await?;
    let pool = create_pool(config.pool_config()).await?;
    run_migrations(&pool).await?;

    let migrations = get_migration_status(&pool).await?;
    if !migrations.is_up_to_date() {
        anyhow::bail!(
            "database schema is behind: {} of {} migrations applied",
            migrations.applied_migrations,
            migrations.known_migrations
        );
    }
    let stats = get_pool_stats(&pool);
    tracing::info!(
        schema_version = ?migrations.latest_version,
        connections = stats.total_connections,
        idle = stats.idle_connections,
        "Database ready"
    );

    let blobs = Arc::new(S3BlobStore::new(config.s3.clone()).await?);
    let tokens = Arc::new(TokenIssuer::new(config.token_config()));

    let state = AppState::new(
        Backends::postgres(&pool, blobs),
        tokens,
        config.upload_config(),
        config.request_timeout,
    )
    .with_database(pool.clone())
    .with_cors_origins(config.api.cors_origins.clone());

    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, closing database pool...");
    close_pool(pool).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
