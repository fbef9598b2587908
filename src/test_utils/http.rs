//! HTTP testing utilities
use super::TestHarness;
use crate::http::server::build_router;
use crate::http::state::HttpServerState;
use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

/// HTTP test client over the full router
pub struct TestApp {
    app: axum::Router,
}

impl TestApp {
    pub fn new(harness: &TestHarness) -> Self {
        let state = HttpServerState {
            name: Arc::new("StatusMetrics Test".to_string()),
            catalog: harness.catalog.clone(),
            series: harness.series.clone(),
            ids: harness.ids.clone(),
        };

        // Same routes as production, 10MB body limit
        let app = build_router(state, 10 * 1024 * 1024, 30);

        Self { app }
    }

    pub async fn get(&self, path: &str) -> Result<TestResponse> {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())?;

        let response = self.app.clone().oneshot(request).await?;
        TestResponse::new(response).await
    }

    pub async fn post_json(&self, path: &str, json_data: &str) -> Result<TestResponse> {
        self.send_json("POST", path, json_data).await
    }

    pub async fn put_json(&self, path: &str, json_data: &str) -> Result<TestResponse> {
        self.send_json("PUT", path, json_data).await
    }

    async fn send_json(&self, method: &str, path: &str, json_data: &str) -> Result<TestResponse> {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(json_data.to_string()))?;

        let response = self.app.clone().oneshot(request).await?;
        TestResponse::new(response).await
    }
}

/// Buffered response
pub struct TestResponse {
    status: StatusCode,
    body: String,
}

impl TestResponse {
    async fn new(response: axum::response::Response) -> Result<Self> {
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok(Self {
            status,
            body: String::from_utf8_lossy(&body_bytes).into_owned(),
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn json<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {}. Body: {}",
            expected, self.status, self.body
        );
        self
    }
}
