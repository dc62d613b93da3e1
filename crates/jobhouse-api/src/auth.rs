//! Cookie-carried HS256 tokens.
//!
//! `POST /jwt` signs whatever identity payload the client sends (it must
//! include an email) and stores the token in the `token` cookie. Protected
//! handlers take an [`AuthUser`], which reads that cookie back and verifies
//! it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::metrics::record_auth_failure;
use crate::state::AppState;

/// Name of the cookie holding the token.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing auth token")]
    MissingToken,

    #[error("auth token expired")]
    Expired,

    #[error("invalid auth token: {0}")]
    Invalid(String),

    #[error("token payload must include a non-empty email")]
    MissingEmail,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl AuthError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing",
            AuthError::Expired => "expired",
            AuthError::Invalid(_) => "invalid",
            AuthError::MissingEmail => "missing_email",
            AuthError::Signing(_) => "signing",
        }
    }
}

/// Signed token claims: the client's identity payload plus issue and
/// expiry times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    /// Remaining payload fields, signed as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Registered claims the server sets or does not validate; client values
/// for them are dropped before signing.
const REGISTERED_CLAIMS: [&str; 5] = ["iat", "exp", "nbf", "aud", "iss"];

/// Signing and verification keys for the shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Sign `payload`, valid from now for the configured lifetime.
    pub fn issue(&self, payload: Map<String, Value>) -> Result<String, AuthError> {
        self.issue_at(payload, Utc::now())
    }

    /// Sign `payload` as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        mut payload: Map<String, Value>,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let email = match payload.remove("email") {
            Some(Value::String(email)) if !email.trim().is_empty() => email,
            _ => return Err(AuthError::MissingEmail),
        };
        for claim in REGISTERED_CLAIMS {
            payload.remove(claim);
        }

        let identity = Identity {
            email,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
            extra: payload,
        };
        encode(&Header::default(), &identity, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

/// Check signature and expiry, returning the signed identity.
pub fn verify_token(keys: &JwtKeys, token: &str) -> Result<Identity, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Identity>(token, &keys.decoding, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid(e.to_string()),
        })
}

/// Cookie carrying a freshly issued token.
///
/// Browsers drop `SameSite=None` cookies without `Secure`, so an insecure
/// (local development) cookie falls back to `Lax`.
pub fn token_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(if secure { SameSite::None } else { SameSite::Lax })
        .build()
}

/// Cookie that clears the token in the browser.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = token_cookie(String::new(), secure);
    cookie.make_removal();
    cookie
}

/// Authenticated caller, extracted from the `token` cookie.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Fail with 403 unless the token belongs to `email`.
    pub fn ensure_owner(&self, email: &str) -> ApiResult<()> {
        if self.0.email == email {
            return Ok(());
        }
        warn!(token_email = %self.0.email, requested = %email, "Identity mismatch");
        Err(ApiError::forbidden("token does not belong to the requested email"))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let verified = jar
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingToken)
            .and_then(|token| verify_token(&state.jwt, token));

        match verified {
            Ok(identity) => Ok(AuthUser(identity)),
            Err(e) => {
                warn!(path = %parts.uri.path(), error = %e, "Rejected request");
                record_auth_failure(e.reason());
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let keys = JwtKeys::new("secret", 24);
        let token = keys
            .issue(payload(json!({"email": "a@x.com", "name": "Ann"})))
            .unwrap();
        let identity = verify_token(&keys, &token).unwrap();
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.extra["name"], json!("Ann"));
        assert_eq!(identity.exp - identity.iat, 24 * 3600);
    }

    #[test]
    fn test_client_registered_claims_are_replaced() {
        let keys = JwtKeys::new("secret", 24);
        let issued_at = Utc::now();
        let token = keys
            .issue_at(
                payload(json!({
                    "email": "a@x.com",
                    "aud": "someone-else",
                    "iss": "elsewhere",
                    "nbf": issued_at.timestamp() + 3600,
                    "exp": 1,
                    "iat": 1
                })),
                issued_at,
            )
            .unwrap();

        let identity = verify_token(&keys, &token).unwrap();
        assert_eq!(identity.iat, issued_at.timestamp());
        assert!(identity.extra.is_empty());
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = JwtKeys::new("one", 24)
            .issue(payload(json!({"email": "a@x.com"})))
            .unwrap();
        let result = verify_token(&JwtKeys::new("two", 24), &token);
        assert!(matches!(result, Err(AuthError::Invalid(_))));
    }

    #[test]
    fn test_expired_token() {
        let keys = JwtKeys::new("secret", 1);
        let token = keys
            .issue_at(payload(json!({"email": "a@x.com"})), Utc::now() - Duration::hours(3))
            .unwrap();
        assert!(matches!(verify_token(&keys, &token), Err(AuthError::Expired)));
    }

    #[test]
    fn test_garbage_token() {
        let keys = JwtKeys::new("secret", 24);
        assert!(matches!(
            verify_token(&keys, "not.a.token"),
            Err(AuthError::Invalid(_))
        ));
    }

    #[test]
    fn test_email_is_required() {
        let keys = JwtKeys::new("secret", 24);
        assert!(matches!(
            keys.issue(payload(json!({"name": "Ann"}))),
            Err(AuthError::MissingEmail)
        ));
        assert!(matches!(
            keys.issue(payload(json!({"email": "  "}))),
            Err(AuthError::MissingEmail)
        ));
        assert!(matches!(
            keys.issue(payload(json!({"email": 7}))),
            Err(AuthError::MissingEmail)
        ));
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = token_cookie("abc".into(), true);
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));

        let removal = removal_cookie(true);
        assert_eq!(removal.value(), "");
        assert!(removal.max_age().is_some_and(|age| age.is_zero()));
    }

    #[test]
    fn test_ensure_owner() {
        let user = AuthUser(Identity {
            email: "a@x.com".into(),
            iat: 0,
            exp: 0,
            extra: Map::new(),
        });
        assert!(user.ensure_owner("a@x.com").is_ok());
        assert!(matches!(
            user.ensure_owner("b@x.com"),
            Err(ApiError::Forbidden(_))
        ));
    }
}
