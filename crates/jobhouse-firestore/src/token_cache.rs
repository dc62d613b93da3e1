//! Access tokens for the Firestore REST API.
//!
//! Production requests carry an OAuth token from the ambient service
//! account, cached until shortly before it expires. The emulator accepts a
//! fixed bearer token instead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use gcp_auth::TokenProvider;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{FirestoreError, FirestoreResult};

/// OAuth scope granting Firestore access.
pub const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Bearer token the emulator treats as an admin.
pub const EMULATOR_TOKEN: &str = "owner";

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when the provider reports an expiry we cannot use.
const FALLBACK_TTL: Duration = Duration::from_secs(50 * 60);

struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }

    fn is_usable(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Caches a provider token; concurrent refreshes collapse into one.
pub struct TokenCache {
    provider: Arc<dyn TokenProvider>,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            cached: RwLock::new(None),
        }
    }

    /// Drop the cached token so the next request fetches a new one.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    pub async fn get_token(&self) -> FirestoreResult<String> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh() {
                return Ok(token.value.clone());
            }
        }

        let mut cached = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            if token.is_fresh() {
                return Ok(token.value.clone());
            }
        }

        match self.provider.token(&[FIRESTORE_SCOPE]).await {
            Ok(token) => {
                let now = Utc::now();
                let expires_at = if token.expires_at() > now {
                    let ttl = (token.expires_at() - now).to_std().unwrap_or(FALLBACK_TTL);
                    Instant::now() + ttl
                } else {
                    Instant::now()
                };
                let value = token.as_str().to_string();
                *cached = Some(CachedToken {
                    value: value.clone(),
                    expires_at,
                });
                debug!("Refreshed Firestore access token");
                Ok(value)
            }
            Err(e) => match cached.as_ref() {
                Some(token) if token.is_usable() => {
                    warn!(error = %e, "Token refresh failed, reusing current token");
                    Ok(token.value.clone())
                }
                _ => Err(FirestoreError::auth_error(format!(
                    "failed to obtain access token: {}",
                    e
                ))),
            },
        }
    }
}

/// How the client authenticates its requests.
pub enum Credentials {
    /// Service account or metadata-server credentials.
    ServiceAccount(TokenCache),
    /// Local emulator; no real credentials are needed.
    Emulator,
}

impl Credentials {
    /// Resolve ambient Google credentials.
    pub async fn service_account() -> FirestoreResult<Self> {
        let provider = gcp_auth::provider()
            .await
            .map_err(|e| FirestoreError::auth_error(format!("no usable credentials: {}", e)))?;
        Ok(Self::ServiceAccount(TokenCache::new(provider)))
    }

    pub async fn bearer(&self) -> FirestoreResult<String> {
        match self {
            Credentials::ServiceAccount(cache) => cache.get_token().await,
            Credentials::Emulator => Ok(EMULATOR_TOKEN.to_string()),
        }
    }

    pub async fn invalidate(&self) {
        if let Credentials::ServiceAccount(cache) = self {
            cache.invalidate().await;
        }
    }
}
