//! Token issuance and logout.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::{CookieJar, WithRejection};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::auth::{removal_cookie, token_cookie};
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_token_issued;
use crate::state::AppState;

/// `POST /jwt`: sign the posted identity and set it as the `token` cookie.
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<Map<String, Value>>, ApiError>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    let email = payload
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let token = state.jwt.issue(payload)?;

    info!(email = %email, "Issued token");
    record_token_issued();

    let jar = jar.add(token_cookie(token, state.config.cookie_secure));
    Ok((jar, Json(json!({ "success": true }))))
}

/// `POST /logout`: clear the `token` cookie. Nothing is kept server-side.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<Value>>,
) -> (CookieJar, Json<Value>) {
    let email = body
        .as_ref()
        .and_then(|Json(b)| b.get("email"))
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    info!(email = %email, "Logging out");

    let jar = jar.add(removal_cookie(state.config.cookie_secure));
    (jar, Json(json!({ "success": true })))
}
