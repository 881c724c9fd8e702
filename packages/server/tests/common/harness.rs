//! Test harness for integration testing.
//!
//! Everything runs in-process against the fakes from
//! `kernel::test_dependencies`: no Redis, NATS or network access needed.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use seo_audit_core::{
    domains::analysis::AnalysisPipeline,
    kernel::{jobs::AnalysisConsumer, ServerDeps, TestDependencies},
    server::build_app,
    QueueConfig,
};
use test_context::AsyncTestContext;
use tower::ServiceExt;

/// Initialize a tracing subscriber that respects RUST_LOG.
/// Uses try_init() so repeated calls across tests are harmless.
/// Run tests with: RUST_LOG=debug cargo test -- --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Test harness holding the fakes and the wired router.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &mut TestHarness) {
///     let (status, body) = ctx.post_json("/scrape", scrape_body(url, email)).await;
/// }
/// ```
pub struct TestHarness {
    pub deps: TestDependencies,
    pub server_deps: ServerDeps,
    pub app: Router,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::with_deps(TestDependencies::new())
    }
}

impl TestHarness {
    /// Build a harness around a customised set of fakes.
    pub fn with_deps(deps: TestDependencies) -> Self {
        init_tracing();
        let server_deps = deps.into_server_deps();
        let app = build_app(&server_deps);
        Self {
            deps,
            server_deps,
            app,
        }
    }

    pub fn pipeline(&self) -> AnalysisPipeline {
        self.server_deps.analysis_pipeline()
    }

    pub fn consumer(&self) -> AnalysisConsumer {
        AnalysisConsumer::new(self.pipeline(), QueueConfig::default())
    }

    /// Send one request through the router.
    pub async fn request(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        (status, headers, body.to_vec())
    }

    /// POST raw bytes with a JSON content type.
    pub async fn post_raw(&self, path: &str, body: impl Into<Body>) -> (StatusCode, serde_json::Value) {
        let request = Request::post(path)
            .header("content-type", "application/json")
            .body(body.into())
            .expect("valid request");
        let (status, _, body) = self.request(request).await;
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.post_raw(path, body.to_string()).await
    }

    pub async fn get_json(&self, path: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::get(path).body(Body::empty()).expect("valid request");
        let (status, _, body) = self.request(request).await;
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}
