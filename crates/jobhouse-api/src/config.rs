//! API configuration.

use std::fmt;

use thiserror::Error;

/// Where documents are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// Process-local store, emptied on restart.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ACCESS_TOKEN_SECRET must be set")]
    MissingSecret,

    #[error("unknown STORE_BACKEND '{0}', expected 'firestore' or 'memory'")]
    UnknownBackend(String),

    #[error("TOKEN_TTL_HOURS must be a whole number of hours between 1 and 8760, got '{0}'")]
    InvalidTokenTtl(String),
}

/// Longest accepted token lifetime: one year.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Collection names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub jobs: String,
    pub applications: String,
    pub reviews: String,
}

/// API server configuration.
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Browser origin allowed to call the API with credentials
    pub cors_origin: String,
    /// HS256 signing secret
    pub token_secret: String,
    pub token_ttl_hours: i64,
    /// Whether the auth cookie carries `Secure`
    pub cookie_secure: bool,
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    pub store_backend: StoreBackend,
    pub collections: Collections,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origin", &self.cors_origin)
            .field("token_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("cookie_secure", &self.cookie_secure)
            .field("max_body_size", &self.max_body_size)
            .field("environment", &self.environment)
            .field("store_backend", &self.store_backend)
            .field("collections", &self.collections)
            .finish()
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_source<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| {
            var(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let flag = |key: &str, default: bool| {
            var(key)
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(default)
        };

        let token_secret = var("ACCESS_TOKEN_SECRET")
            .or_else(|| var("ACCESS_TOKEN_SECRECT"))
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let token_ttl_hours = match var("TOKEN_TTL_HOURS") {
            None => 24,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|hours| (1..=MAX_TOKEN_TTL_HOURS).contains(hours))
                .ok_or(ConfigError::InvalidTokenTtl(raw))?,
        };

        Ok(Self {
            host: text("API_HOST", "0.0.0.0"),
            port: parsed(var("PORT")).unwrap_or(5000),
            cors_origin: text("CORS_ORIGIN", "http://localhost:5173"),
            token_secret,
            token_ttl_hours,
            cookie_secure: flag("COOKIE_SECURE", true),
            max_body_size: parsed(var("MAX_BODY_SIZE")).unwrap_or(1024 * 1024),
            environment: text("ENVIRONMENT", "development"),
            store_backend: text("STORE_BACKEND", "firestore").parse()?,
            collections: Collections {
                jobs: text("JOBS_COLLECTION", "jobs"),
                applications: text("JOB_APPLICATIONS_COLLECTION", "jobApplies"),
                reviews: text("REVIEWS_COLLECTION", "customerReviews"),
            },
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

fn parsed<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}
