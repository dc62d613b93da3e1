//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    applications_by_category, create_application, create_job, delete_job, get_job, health,
    increment_applicants, issue_token, jobs_by_category, jobs_by_title, list_applications,
    list_jobs, list_jobs_by_email, list_reviews, logout, ready, replace_job, root,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, redact_internal_errors, request_id, request_logging, security_headers,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let auth_routes = Router::new()
        .route("/jwt", post(issue_token))
        .route("/logout", post(logout));

    let job_routes = Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobsByEmail", get(list_jobs_by_email))
        .route("/jobsByEmail/:id", delete(delete_job))
        .route("/jobsById/:id", get(get_job).put(replace_job))
        .route("/jobApplicant/:id", patch(increment_applicants))
        .route("/jobByCategory/:category", get(jobs_by_category))
        .route("/jobByTitle/:job_title", get(jobs_by_title));

    let application_routes = Router::new()
        .route("/jobApplies", post(create_application))
        .route("/jobAppliesByEmail", get(list_applications))
        .route("/jobAppliesByEmail/:category", get(applications_by_category));

    let review_routes = Router::new().route("/customerReviews", get(list_reviews));

    let health_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    let cors = cors_layer(&state.config.cors_origin);

    let mut router = Router::new()
        .merge(auth_routes)
        .merge(job_routes)
        .merge(application_routes)
        .merge(review_routes)
        .merge(health_routes)
        .merge(metrics_routes);

    if state.config.is_production() {
        router = router.layer(middleware::from_fn(redact_internal_errors));
    }

    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors)
        .with_state(state)
}
