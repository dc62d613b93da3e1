//! Job listing handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use validator::Validate;

use jobhouse_models::{DeleteResult, InsertResult, Job, JobDraft, UpdateResult};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

/// `GET /jobs`
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<Job>>> {
    Ok(Json(state.jobs.list().await?))
}

/// `GET /jobsByEmail?email=`: the caller's own listings.
pub async fn list_jobs_by_email(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<EmailQuery>,
) -> ApiResult<Json<Vec<Job>>> {
    let email = query
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("email query parameter is required"))?;
    user.ensure_owner(&email)?;

    Ok(Json(state.jobs.list_by_email(&email).await?))
}

/// `GET /jobsById/:id`
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Job>> {
    state
        .jobs
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("job {}", id)))
}

/// `POST /jobs`
pub async fn create_job(
    State(state): State<AppState>,
    WithRejection(Json(draft), _): WithRejection<Json<JobDraft>, ApiError>,
) -> ApiResult<Json<InsertResult>> {
    draft.validate()?;
    Ok(Json(state.jobs.create(&draft).await?))
}

/// `PUT /jobsById/:id`: overwrite every listing field.
pub async fn replace_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WithRejection(Json(draft), _): WithRejection<Json<JobDraft>, ApiError>,
) -> ApiResult<Json<UpdateResult>> {
    draft.validate()?;
    Ok(Json(state.jobs.replace(&id, &draft).await?))
}

/// `PATCH /jobApplicant/:id`: one more applicant.
pub async fn increment_applicants(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UpdateResult>> {
    Ok(Json(state.jobs.increment_applicants(&id).await?))
}

/// `DELETE /jobsByEmail/:id`
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResult>> {
    Ok(Json(state.jobs.delete(&id).await?))
}

/// `GET /jobByCategory/:category`
pub async fn jobs_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<Job>>> {
    Ok(Json(state.jobs.list_by_category(&category).await?))
}

/// `GET /jobByTitle/:jobTitle`
pub async fn jobs_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> ApiResult<Json<Vec<Job>>> {
    Ok(Json(state.jobs.list_by_title(&title).await?))
}
