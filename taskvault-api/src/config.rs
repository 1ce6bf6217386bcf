/// Configuration management for the API server
///
/// This module loads configuration from environment variables and hands the
/// shared crate plain config structs.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET_KEY_USER`: Secret key for session tokens (required, 32+ chars)
/// - `JWT_TTL`: Session lifetime in minutes (default: 60, at most one year)
/// - `REQUEST_TIMEOUT_SECONDS`: Per-operation deadline (default: 10)
/// - `S3_ENDPOINT`, `S3_REGION`, `S3_BUCKET_NAME`, `S3_ACCESS_KEY`, `S3_SECRET_KEY` (required)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `RUST_LOG`: Log filter (default: `taskvault_api=debug,tower_http=debug`)
///
/// # Example
///
/// ```no_run
/// use taskvault_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::{env, str::FromStr, time::Duration};
use taskvault_shared::{
    auth::jwt::{TokenConfig, MAX_TTL_MINUTES},
    db::pool::DatabaseConfig as PoolConfig,
    storage::s3::S3Config,
    upload::UploadConfig,
};

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Object storage configuration
    pub s3: S3Config,

    /// Deadline applied to every service operation
    pub request_timeout: Duration,

    /// Log output format
    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in minutes
    pub ttl_minutes: i64,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file is read first when present.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };

        let api_host = var_or("API_HOST", "0.0.0.0");
        let api_port = var_or("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;
        let cors_origins = var_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = required("DATABASE_URL")?;
        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let jwt_secret = required("JWT_SECRET_KEY_USER")?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET_KEY_USER must be at least 32 characters long");
        }
        let ttl_minutes = var_or("JWT_TTL", "60")
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("JWT_TTL is invalid: {}", e))?;
        if ttl_minutes <= 0 || ttl_minutes > MAX_TTL_MINUTES {
            anyhow::bail!(
                "JWT_TTL must be between 1 and {} minutes, got {}",
                MAX_TTL_MINUTES,
                ttl_minutes
            );
        }

        let timeout_seconds = var_or("REQUEST_TIMEOUT_SECONDS", "10")
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("REQUEST_TIMEOUT_SECONDS is invalid: {}", e))?;
        if timeout_seconds == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECONDS must be greater than zero");
        }

        let s3 = S3Config {
            endpoint: required("S3_ENDPOINT")?,
            region: required("S3_REGION")?,
            bucket: required("S3_BUCKET_NAME")?,
            access_key: required("S3_ACCESS_KEY")?,
            secret_key: required("S3_SECRET_KEY")?,
        };

        let log_format = var_or("LOG_FORMAT", "pretty").parse()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_minutes,
            },
            s3,
            request_timeout: Duration::from_secs(timeout_seconds),
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Session token settings
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            secret: self.jwt.secret.clone(),
            ttl_minutes: self.jwt.ttl_minutes,
        }
    }

    /// Connection pool settings
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            ..PoolConfig::default()
        }
    }

    /// Upload pipeline settings; the blob write shares the request deadline
    pub fn upload_config(&self) -> UploadConfig {
        UploadConfig {
            timeout: self.request_timeout,
            ..UploadConfig::default()
        }
    }
}
