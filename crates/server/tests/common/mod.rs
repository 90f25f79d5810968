//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock pipeline stages injected, enabling end-to-end testing of the
//! job API without a real portal.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use oabrief_core::{
    testing::{fixtures, MockAuthenticator, MockScraper, MockSummarizer},
    Config, JobConfig, JobOrchestrator, JobStatus, WebConfig,
};
use oabrief_server::{api::create_router, state::AppState};

/// Contents of the dashboard page served from the temp static dir
pub const INDEX_HTML: &str = "<!doctype html><title>OA Brief</title>";

/// Test fixture for E2E testing with mock stages.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_start() {
///     let fixture = TestFixture::new();
///     let response = fixture.post("/api/start", json!({"username": "a", "password": "b"})).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The orchestrator behind the router
    pub orchestrator: Arc<JobOrchestrator>,
    /// Mock login stage
    pub authenticator: MockAuthenticator,
    /// Mock scrape stage - configure returned records
    pub scraper: MockScraper,
    /// Mock summary stage
    pub summarizer: MockSummarizer,
    /// Temporary static directory
    pub static_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub fn new() -> Self {
        Self::with_job_config(JobConfig::default())
    }

    /// Create a test fixture with a custom job configuration.
    pub fn with_job_config(job: JobConfig) -> Self {
        let static_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(static_dir.path().join("index.html"), INDEX_HTML)
            .expect("Failed to write index.html");

        let authenticator = MockAuthenticator::new();
        let scraper = MockScraper::new();
        let summarizer = MockSummarizer::new();
        let stages = fixtures::stages(authenticator.clone(), scraper.clone(), summarizer.clone());

        let config = Config {
            job: job.clone(),
            web: WebConfig {
                static_dir: static_dir.path().to_path_buf(),
            },
            ..Default::default()
        };

        let orchestrator = Arc::new(JobOrchestrator::new(job, stages));
        let state = Arc::new(AppState::new(config, Arc::clone(&orchestrator)));
        let router = create_router(state);

        Self {
            router,
            orchestrator,
            authenticator,
            scraper,
            summarizer,
            static_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body.to_string())).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request("POST", path, Some(body.to_string())).await
    }

    /// Poll `/api/status` until the job reaches `expected`.
    pub async fn wait_for_status(&self, expected: JobStatus, timeout: Duration) -> bool {
        let start = tokio::time::Instant::now();
        while start.elapsed() < timeout {
            let response = self.get("/api/status").await;
            if response.body["status"] == expected.as_str() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<String>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(json_body)
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
