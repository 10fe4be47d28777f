//! Common test utilities for in-process API testing with mocks.
//!
//! This module provides a test fixture that builds the router with mock
//! dependencies injected, so the HTTP surface can be exercised without
//! TMDB or a booking endpoint.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use boxoffice_core::{
    testing::{MockBookingUploader, MockMovieCatalog, ScriptedRandom},
    BookingUploader, Config, MovieCatalog, RandomSource,
};
use boxoffice_server::state::AppState;

/// Re-export fixtures for test convenience
pub use boxoffice_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// Provides an in-process router with fully controllable mocks for:
/// - Movie catalog (MockMovieCatalog)
/// - Booking upload (MockBookingUploader)
///
/// Seat layouts are drawn from `TestConfig::pattern`, so tests know which
/// seats are occupied.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_session_creation() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/sessions", json!({
///         "movie_title": "Wicked"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state behind the router
    pub state: Arc<AppState>,
    /// Mock catalog - configure movie listings
    pub catalog: Arc<MockMovieCatalog>,
    /// Mock uploader - inspect or fail uploads
    pub uploader: Arc<MockBookingUploader>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Wire up the mock catalog
    pub enable_catalog: bool,
    /// Wire up the mock uploader
    pub enable_booking: bool,
    /// Park uploads until the test releases them
    pub hold_uploads: bool,
    /// Occupied seats per row (`X`), row A first; empty means all available
    pub pattern: Vec<String>,
    /// Application config
    pub config: Config,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            enable_catalog: true,
            enable_booking: true,
            hold_uploads: false,
            pattern: Vec::new(),
            config: Config::default(),
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let catalog = Arc::new(MockMovieCatalog::new());
        let uploader = Arc::new(if test_config.hold_uploads {
            MockBookingUploader::held()
        } else {
            MockBookingUploader::new()
        });

        let pattern = test_config.pattern.clone();
        let random = Arc::new(move || -> Box<dyn RandomSource> {
            if pattern.is_empty() {
                Box::new(ScriptedRandom::all_available())
            } else {
                let rows: Vec<&str> = pattern.iter().map(String::as_str).collect();
                Box::new(ScriptedRandom::from_pattern(&rows))
            }
        });

        let state = Arc::new(
            AppState::new(
                test_config.config,
                test_config
                    .enable_catalog
                    .then(|| Arc::clone(&catalog) as Arc<dyn MovieCatalog>),
                test_config
                    .enable_booking
                    .then(|| Arc::clone(&uploader) as Arc<dyn BookingUploader>),
            )
            .with_random_source(random),
        );

        let router = boxoffice_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            catalog,
            uploader,
        }
    }

    /// Create a session for a movie title and return its ID.
    pub async fn create_session(&self, title: &str) -> String {
        let response = self
            .post(
                "/api/v1/sessions",
                serde_json::json!({
                    "movie_title": title,
                    "show_date": "2024-12-20",
                    "show_time": "19:30",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"]
            .as_str()
            .expect("session id")
            .to_string()
    }

    /// Toggle a seat in a session.
    pub async fn toggle(&self, session_id: &str, row: i32, column: i32) -> TestResponse {
        self.post_empty(&format!(
            "/api/v1/sessions/{}/seats/{}/{}/toggle",
            session_id, row, column
        ))
        .await
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a body-less POST from a background task.
    pub fn spawn_post_empty(&self, path: &str) -> tokio::task::JoinHandle<StatusCode> {
        let router = self.router.clone();
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        tokio::spawn(async move {
            router
                .oneshot(request)
                .await
                .expect("Failed to send request")
                .status()
        })
    }

    /// Send a request and return the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
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

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
