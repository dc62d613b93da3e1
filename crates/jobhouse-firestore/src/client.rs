//! Firestore REST API client.
//!
//! Every call runs inside a `firestore_request` span, is retried on
//! transient failures, and is counted in the request metrics. A request
//! rejected with an expired access token is re-sent once with a new token.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info_span, Instrument};

use crate::error::{FirestoreError, FirestoreResult};
use crate::metrics::{outcome_label, record_request};
use crate::retry::{with_retry, RetryConfig};
use crate::token_cache::Credentials;
use crate::types::{
    CommitRequest, CommitResponse, Document, DocumentTransform, FieldTransform,
    FromFirestoreValue, Precondition, RunQueryRequest, RunQueryResponse, StructuredQuery,
    ToFirestoreValue, Value, Write,
};

const PRODUCTION_HOST: &str = "https://firestore.googleapis.com";

/// Project used against the emulator when none is configured.
const EMULATOR_PROJECT: &str = "demo-jobhouse";

/// Firestore client configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryConfig,
    /// `host:port` (or a full URL) of a Firestore emulator. When set,
    /// requests go there and no credentials are loaded.
    pub emulator_host: Option<String>,
}

impl FirestoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> FirestoreResult<Self> {
        let emulator_host = std::env::var("FIRESTORE_EMULATOR_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty());

        let project_id = std::env::var("GCP_PROJECT_ID")
            .or_else(|_| std::env::var("FIREBASE_PROJECT_ID"))
            .ok()
            .filter(|p| !p.trim().is_empty());
        let project_id = match (project_id, &emulator_host) {
            (Some(p), _) => p,
            (None, Some(_)) => EMULATOR_PROJECT.to_string(),
            (None, None) => {
                return Err(FirestoreError::auth_error(
                    "GCP_PROJECT_ID or FIREBASE_PROJECT_ID must be set to access Firestore",
                ))
            }
        };

        let connect_timeout_secs: u64 = std::env::var("FIRESTORE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            project_id,
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| "(default)".to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
            emulator_host,
        })
    }

    /// Configuration for talking to an emulator at `host`.
    pub fn emulator(project_id: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: "(default)".to_string(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(2),
            retry: RetryConfig::default(),
            emulator_host: Some(host.into()),
        }
    }

    /// Resource name of the database's document root.
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database_id
        )
    }

    fn host(&self) -> String {
        match &self.emulator_host {
            Some(h) if h.starts_with("http://") || h.starts_with("https://") => {
                h.trim_end_matches('/').to_string()
            }
            Some(h) => format!("http://{}", h.trim_end_matches('/')),
            None => PRODUCTION_HOST.to_string(),
        }
    }
}

/// Firestore REST API client.
pub struct FirestoreClient {
    http: Client,
    config: FirestoreConfig,
    /// `projects/{p}/databases/{d}/documents`
    root: String,
    /// `{host}/v1/{root}`
    base_url: String,
    credentials: Credentials,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    pub async fn new(config: FirestoreConfig) -> FirestoreResult<Self> {
        let credentials = if config.emulator_host.is_some() {
            Credentials::Emulator
        } else {
            Credentials::service_account().await?
        };

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("jobhouse-firestore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FirestoreError::Network)?;

        let root = config.documents_root();
        let base_url = format!("{}/v1/{}", config.host(), root);
        debug!(base_url = %base_url, emulator = config.emulator_host.is_some(), "Firestore client ready");

        Ok(Self {
            http,
            config,
            root,
            base_url,
            credentials,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> FirestoreResult<Self> {
        Self::new(FirestoreConfig::from_env()?).await
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    fn document_url(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            collection,
            urlencoding::encode(doc_id)
        )
    }

    fn document_name(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{}/{}", self.root, collection, doc_id)
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Get a document, `None` if it does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> FirestoreResult<Option<Document>> {
        let url = self.document_url(collection, doc_id);
        let url = url.as_str();

        self.execute("get_document", collection, move || async move {
            let response = self.send(|token| self.http.get(url).bearer_auth(token)).await?;
            match response.status() {
                StatusCode::OK => Ok(Some(response.json().await?)),
                StatusCode::NOT_FOUND => Ok(None),
                _ => Err(Self::error_from_response(response).await),
            }
        })
        .await
    }

    /// Create a document with a server-assigned id.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: HashMap<String, Value>,
    ) -> FirestoreResult<Document> {
        let url = format!("{}/{}", self.base_url, collection);
        let url = url.as_str();
        let body = Document::new(fields);
        let body = &body;

        self.execute("create_document", collection, move || async move {
            let response = self
                .send(|token| self.http.post(url).bearer_auth(token).json(body))
                .await?;
            match response.status() {
                StatusCode::OK | StatusCode::CREATED => Ok(response.json().await?),
                _ => Err(Self::error_from_response(response).await),
            }
        })
        .await
    }

    /// Overwrite the masked fields of an existing document. Masked paths
    /// missing from `fields` are deleted. `None` if the document does not
    /// exist.
    pub async fn update_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
        update_mask: &[&str],
    ) -> FirestoreResult<Option<Document>> {
        let mut params: Vec<String> = update_mask
            .iter()
            .map(|f| format!("updateMask.fieldPaths={}", urlencoding::encode(f)))
            .collect();
        params.push("currentDocument.exists=true".to_string());
        let url = format!(
            "{}?{}",
            self.document_url(collection, doc_id),
            params.join("&")
        );
        let url = url.as_str();
        let body = Document::new(fields);
        let body = &body;

        self.execute("update_document", collection, move || async move {
            let response = self
                .send(|token| self.http.patch(url).bearer_auth(token).json(body))
                .await?;
            match response.status() {
                StatusCode::OK => Ok(Some(response.json().await?)),
                StatusCode::NOT_FOUND => Ok(None),
                _ => Err(Self::error_from_response(response).await),
            }
        })
        .await
    }

    /// Delete a document. Returns `false` if it did not exist.
    pub async fn delete_document(&self, collection: &str, doc_id: &str) -> FirestoreResult<bool> {
        let url = format!(
            "{}?currentDocument.exists=true",
            self.document_url(collection, doc_id)
        );
        let url = url.as_str();

        self.execute("delete_document", collection, move || async move {
            let response = self
                .send(|token| self.http.delete(url).bearer_auth(token))
                .await?;
            match response.status() {
                StatusCode::OK | StatusCode::NO_CONTENT => Ok(true),
                StatusCode::NOT_FOUND => Ok(false),
                _ => Err(Self::error_from_response(response).await),
            }
        })
        .await
    }

    // =========================================================================
    // Queries and commits
    // =========================================================================

    /// Run a structured query against the document root.
    pub async fn run_query(&self, query: StructuredQuery) -> FirestoreResult<Vec<Document>> {
        let url = format!("{}:runQuery", self.base_url);
        let url = url.as_str();
        let collection = query
            .from
            .first()
            .map(|c| c.collection_id.clone())
            .unwrap_or_default();
        let request = RunQueryRequest {
            structured_query: query,
        };
        let request = &request;

        self.execute("run_query", &collection, move || async move {
            let response = self
                .send(|token| self.http.post(url).bearer_auth(token).json(request))
                .await?;
            if response.status() != StatusCode::OK {
                return Err(Self::error_from_response(response).await);
            }
            let results: Vec<RunQueryResponse> = response.json().await?;
            Ok(results.into_iter().filter_map(|r| r.document).collect())
        })
        .await
    }

    /// Apply writes atomically.
    pub async fn commit(&self, writes: Vec<Write>) -> FirestoreResult<CommitResponse> {
        let url = format!("{}:commit", self.base_url);
        let url = url.as_str();
        let request = CommitRequest { writes };
        let request = &request;

        self.execute("commit", "", move || async move {
            let response = self
                .send(|token| self.http.post(url).bearer_auth(token).json(request))
                .await?;
            if response.status() != StatusCode::OK {
                return Err(Self::error_from_response(response).await);
            }
            Ok(response.json().await?)
        })
        .await
    }

    /// Atomically add `by` to an integer field server-side and return the
    /// new value. A missing field counts as zero. `None` if the document
    /// does not exist.
    pub async fn increment_field(
        &self,
        collection: &str,
        doc_id: &str,
        field: &str,
        by: i64,
    ) -> FirestoreResult<Option<i64>> {
        let write = Write {
            transform: Some(DocumentTransform {
                document: self.document_name(collection, doc_id),
                field_transforms: vec![FieldTransform {
                    field_path: field.to_string(),
                    increment: by.to_firestore_value(),
                }],
            }),
            current_document: Some(Precondition::must_exist()),
        };

        let response = match self.commit(vec![write]).await {
            Ok(response) => response,
            Err(FirestoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        response
            .write_results
            .first()
            .and_then(|r| r.transform_results.first())
            .and_then(i64::from_firestore_value)
            .map(Some)
            .ok_or_else(|| {
                FirestoreError::InvalidResponse(format!(
                    "commit for {}/{} returned no transform result",
                    collection, doc_id
                ))
            })
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    async fn execute<T, F, Fut>(
        &self,
        operation: &'static str,
        collection: &str,
        op: F,
    ) -> FirestoreResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = FirestoreResult<T>>,
    {
        let span = info_span!("firestore_request", operation = %operation, collection = %collection);
        let start = Instant::now();
        let result = with_retry(&self.config.retry, operation, op)
            .instrument(span)
            .await;
        record_request(operation, outcome_label(&result), start.elapsed());
        result
    }

    /// Send a request, re-sending once with a fresh token if the current
    /// one was rejected as expired.
    async fn send<F>(&self, build: F) -> FirestoreResult<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = self.credentials.bearer().await?;
        let response = build(&token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if !Self::is_access_token_expired(&body) {
            return Err(FirestoreError::from_http_status(401, body));
        }

        debug!("Firestore access token expired, refreshing");
        self.credentials.invalidate().await;
        let token = self.credentials.bearer().await?;
        Ok(build(&token).send().await?)
    }

    fn is_access_token_expired(body: &str) -> bool {
        body.contains("ACCESS_TOKEN_EXPIRED") || body.contains("\"UNAUTHENTICATED\"")
    }

    async fn error_from_response(response: Response) -> FirestoreError {
        let status = response.status();
        let url = response.url().path().to_string();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0);
            return FirestoreError::RateLimited(retry_after_secs.saturating_mul(1000));
        }

        let body = response.text().await.unwrap_or_default();
        FirestoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}
