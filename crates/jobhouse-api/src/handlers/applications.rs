//! Job application handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use axum_extra::extract::WithRejection;
use validator::Validate;

use jobhouse_models::{InsertResult, JobApplication, JobApplicationDraft};

use crate::error::{ApiError, ApiResult};
use crate::handlers::jobs::EmailQuery;
use crate::state::AppState;

/// `POST /jobApplies`
pub async fn create_application(
    State(state): State<AppState>,
    WithRejection(Json(draft), _): WithRejection<Json<JobApplicationDraft>, ApiError>,
) -> ApiResult<Json<InsertResult>> {
    draft.validate()?;
    Ok(Json(state.applications.create(&draft).await?))
}

/// `GET /jobAppliesByEmail[?email=]`: every application, or one applicant's.
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<Vec<JobApplication>>> {
    let email = query.email.as_deref().filter(|e| !e.is_empty());
    Ok(Json(state.applications.list(email).await?))
}

/// `GET /jobAppliesByEmail/:category`
pub async fn applications_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<JobApplication>>> {
    Ok(Json(state.applications.list_by_category(&category).await?))
}
