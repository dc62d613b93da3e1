//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "jobhouse_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "jobhouse_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "jobhouse_http_requests_in_flight";

    pub const AUTH_FAILURES_TOTAL: &str = "jobhouse_auth_failures_total";
    pub const TOKENS_ISSUED_TOTAL: &str = "jobhouse_tokens_issued_total";
}

/// Routes whose next path segment is a parameter, with the label used for it.
const PARAMETERIZED: [(&str, &str); 6] = [
    ("jobsById", ":id"),
    ("jobApplicant", ":id"),
    ("jobsByEmail", ":id"),
    ("jobByCategory", ":category"),
    ("jobByTitle", ":jobTitle"),
    ("jobAppliesByEmail", ":category"),
];

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a rejected token.
pub fn record_auth_failure(reason: &'static str) {
    counter!(names::AUTH_FAILURES_TOTAL, "reason" => reason).increment(1);
}

pub fn record_token_issued() {
    counter!(names::TOKENS_ISSUED_TOTAL).increment(1);
}

/// Replace path parameters with placeholders so label cardinality stays
/// bounded.
fn sanitize_path(path: &str) -> String {
    let mut out = Vec::new();
    let mut placeholder: Option<&str> = None;
    for segment in path.split('/') {
        match placeholder.take() {
            Some(label) if !segment.is_empty() => out.push(label),
            _ => {
                placeholder = PARAMETERIZED
                    .iter()
                    .find(|(route, _)| *route == segment)
                    .map(|(_, label)| *label);
                out.push(segment);
            }
        }
    }
    out.join("/")
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );

    response
}
