//! Firestore request metrics.

use std::time::Duration;

use metrics::{counter, histogram};

use crate::error::FirestoreError;

pub mod names {
    pub const REQUESTS_TOTAL: &str = "jobhouse_firestore_requests_total";
    pub const RETRIES_TOTAL: &str = "jobhouse_firestore_retries_total";
    pub const LATENCY_SECONDS: &str = "jobhouse_firestore_latency_seconds";
}

/// Label for a finished request: `ok`, an HTTP status, or `network`.
pub fn outcome_label<T>(result: &Result<T, FirestoreError>) -> String {
    match result {
        Ok(_) => "ok".to_string(),
        Err(e) => e
            .http_status()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "network".to_string()),
    }
}

/// Record a completed request, including all of its retries.
pub fn record_request(operation: &str, outcome: String, elapsed: Duration) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(names::LATENCY_SECONDS, "operation" => operation.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_retry(operation: &str) {
    counter!(names::RETRIES_TOTAL, "operation" => operation.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label(&Ok::<(), FirestoreError>(())), "ok");
        assert_eq!(
            outcome_label::<()>(&Err(FirestoreError::not_found("jobs/a"))),
            "404"
        );
        assert_eq!(
            outcome_label::<()>(&Err(FirestoreError::ServerError(503, "x".into()))),
            "503"
        );
        assert_eq!(
            outcome_label::<()>(&Err(FirestoreError::InvalidResponse("x".into()))),
            "network"
        );
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request("get", "ok".into(), Duration::from_millis(3));
        record_retry("get");
    }
}
