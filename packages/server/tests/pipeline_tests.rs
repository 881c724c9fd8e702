//! Integration tests for the analysis pipeline and queue message handling.

mod common;

use std::time::Duration;

use seo_audit_core::common::AnalysisRequest;
use seo_audit_core::domains::analysis::{FetchError, PipelineError, SummaryOrigin};
use seo_audit_core::kernel::jobs::MessageOutcome;
use seo_audit_core::kernel::test_dependencies::{
    MockAI, MockEmailService, MockPageFetcher, TEST_EPOCH_MILLIS,
};
use seo_audit_core::kernel::TestDependencies;

use crate::common::{empty_page, full_marks_page, TestHarness, EMPTY_URL, FULL_MARKS_URL};

const OWNER: &str = "owner@acme.test";

fn request(url: &str) -> AnalysisRequest {
    AnalysisRequest {
        url: url.to_string(),
        email: OWNER.to_string(),
    }
}

fn harness_with(fetcher: MockPageFetcher, ai: MockAI) -> TestHarness {
    TestHarness::with_deps(TestDependencies::new().mock_fetcher(fetcher).mock_ai(ai))
}

fn stored_artifact(ctx: &TestHarness, key: &str) -> serde_json::Value {
    let raw = ctx.deps.kv.value(key).expect("artifact should be stored");
    serde_json::from_str(&raw).expect("artifact should be JSON")
}

#[tokio::test]
async fn full_run_stores_artifact_and_sends_email() {
    let ctx = harness_with(
        MockPageFetcher::new().with_page(FULL_MARKS_URL, &full_marks_page()),
        MockAI::new().with_response(
            r#"{"score": 100, "summary": "Excellent.", "observations": {"title": "Good"},
                "recommendations": ["Keep it up"], "priorityActions": []}"#,
        ),
    );

    let outcome = ctx.pipeline().process(&request(FULL_MARKS_URL)).await.unwrap();

    assert_eq!(outcome.score, 100);
    assert_eq!(outcome.summary_origin, SummaryOrigin::Parsed);
    assert!(outcome.email_sent);
    assert_eq!(outcome.key, format!("result:{}:{}", OWNER, TEST_EPOCH_MILLIS));

    let artifact = stored_artifact(&ctx, &outcome.key);
    assert_eq!(artifact["url"], FULL_MARKS_URL);
    assert_eq!(artifact["scrapedAt"], "2026-01-01T00:00:00.000Z");
    assert_eq!(artifact["rawHtml"], full_marks_page());
    assert_eq!(artifact["extracted"]["title"], "Acme Widgets Online Store");
    assert_eq!(artifact["extracted"]["links"].as_array().unwrap().len(), 15);
    assert_eq!(artifact["aiSummary"]["summary"], "Excellent.");
    assert_eq!(artifact["aiSummary"]["priorityActions"], serde_json::json!([]));

    let puts = ctx.deps.kv.puts();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].ttl, Duration::from_secs(604_800));

    let calls = ctx.deps.ai.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.contains("\"score\": 100,"));
    assert!(calls[0].1.contains("Links: 15 total"));
    assert!(!calls[0].1.contains("<html>"));

    let sent = ctx.deps.email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, OWNER);
    assert_eq!(sent[0].subject, "Your SEO Report is Ready");
    assert!(sent[0].html.contains("#28a745"));
    assert!(sent[0].html.contains("<li>Keep it up</li>"));
    assert!(!sent[0].html.contains("Priority Actions"));
}

#[tokio::test]
async fn unparseable_ai_reply_stores_fallback() {
    let ctx = harness_with(
        MockPageFetcher::new().with_page(EMPTY_URL, &empty_page()),
        MockAI::new().with_response("Here's what I think about your page: it's fine."),
    );

    let outcome = ctx.pipeline().process(&request(EMPTY_URL)).await.unwrap();

    assert_eq!(outcome.score, 20);
    assert_eq!(outcome.summary_origin, SummaryOrigin::Fallback);

    let artifact = stored_artifact(&ctx, &outcome.key);
    assert_eq!(
        artifact["aiSummary"],
        serde_json::json!({
            "score": null,
            "summary": "Failed to parse AI response.",
            "observations": {},
            "recommendations": [],
            "priorityActions": []
        })
    );

    let sent = ctx.deps.email.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].html.contains("N/A"));
    assert!(sent[0].html.contains("#ffc107"));
}

#[tokio::test]
async fn unreachable_page_fails_without_storing() {
    let ctx = harness_with(MockPageFetcher::new(), MockAI::new());

    let err = ctx
        .pipeline()
        .process(&request("https://down.test/"))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(FetchError::Transport { .. })));
    assert_eq!(err.stage(), "extract");
    assert!(ctx.deps.ai.calls().is_empty());
    assert!(ctx.deps.kv.puts().is_empty());
    assert!(ctx.deps.email.sent().is_empty());
}

#[tokio::test]
async fn error_status_fails_the_fetch() {
    let ctx = harness_with(
        MockPageFetcher::new().with_status("https://gone.test/", 404, "<html>Not found</html>"),
        MockAI::new(),
    );

    let err = ctx
        .pipeline()
        .process(&request("https://gone.test/"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Fetch(FetchError::Status { status: 404, .. })
    ));
    assert!(ctx.deps.kv.puts().is_empty());
}

#[tokio::test]
async fn ai_outage_fails_without_storing() {
    let ctx = harness_with(
        MockPageFetcher::new().with_page(EMPTY_URL, &empty_page()),
        MockAI::new().failing("connection reset"),
    );

    let err = ctx.pipeline().process(&request(EMPTY_URL)).await.unwrap_err();

    assert!(matches!(err, PipelineError::Summarize(_)));
    assert!(ctx.deps.kv.puts().is_empty());
    assert!(ctx.deps.email.sent().is_empty());
}

#[tokio::test]
async fn store_failure_fails_before_email() {
    let ctx = TestHarness::with_deps(
        TestDependencies::new()
            .mock_fetcher(MockPageFetcher::new().with_page(EMPTY_URL, &empty_page()))
            .failing_store(),
    );

    let err = ctx.pipeline().process(&request(EMPTY_URL)).await.unwrap_err();

    assert!(matches!(err, PipelineError::Store(_)));
    assert!(ctx.deps.email.sent().is_empty());
}

#[tokio::test]
async fn email_failure_keeps_the_artifact() {
    let ctx = TestHarness::with_deps(
        TestDependencies::new()
            .mock_fetcher(MockPageFetcher::new().with_page(EMPTY_URL, &empty_page()))
            .mock_email(MockEmailService::new().failing()),
    );

    let outcome = ctx.pipeline().process(&request(EMPTY_URL)).await.unwrap();

    assert!(!outcome.email_sent);
    assert!(ctx.deps.kv.value(&outcome.key).is_some());
}

#[tokio::test]
async fn report_footer_year_follows_the_clock() {
    let ctx = harness_with(
        MockPageFetcher::new().with_page(EMPTY_URL, &empty_page()),
        MockAI::new(),
    );

    ctx.pipeline().process(&request(EMPTY_URL)).await.unwrap();
    // 2031-06-02T00:00:00Z
    ctx.deps.clock.set(1_938_124_800_000);
    ctx.pipeline().process(&request(EMPTY_URL)).await.unwrap();

    let sent = ctx.deps.email.sent();
    assert!(sent[0].html.contains("© 2026 BriefUGC"));
    assert!(sent[1].html.contains("© 2031 BriefUGC"));
}

#[tokio::test]
async fn repeat_runs_store_distinct_artifacts() {
    let ctx = harness_with(
        MockPageFetcher::new().with_page(EMPTY_URL, &empty_page()),
        MockAI::new(),
    );

    let first = ctx.pipeline().process(&request(EMPTY_URL)).await.unwrap();
    ctx.deps.clock.advance(Duration::from_millis(5));
    let second = ctx.pipeline().process(&request(EMPTY_URL)).await.unwrap();

    assert_ne!(first.key, second.key);
    assert_eq!(
        ctx.deps.kv.keys_with_prefix(&format!("result:{}:", OWNER)),
        vec![first.key, second.key]
    );
}

#[tokio::test]
async fn consumer_acks_successful_messages() {
    let ctx = harness_with(
        MockPageFetcher::new().with_page(EMPTY_URL, &empty_page()),
        MockAI::new(),
    );
    let payload = serde_json::to_vec(&request(EMPTY_URL)).unwrap();

    assert_eq!(ctx.consumer().handle_payload(&payload).await, MessageOutcome::Ack);
}

#[tokio::test]
async fn consumer_retries_failed_pipelines() {
    let ctx = harness_with(MockPageFetcher::new(), MockAI::new());
    let payload = serde_json::to_vec(&request("https://down.test/")).unwrap();

    assert_eq!(ctx.consumer().handle_payload(&payload).await, MessageOutcome::Retry);
}

#[tokio::test]
async fn consumer_retries_transient_failures() {
    let cases = [
        harness_with(
            MockPageFetcher::new().with_status("https://busy.test/", 503, "Unavailable"),
            MockAI::new(),
        ),
        harness_with(
            MockPageFetcher::new().with_page("https://busy.test/", &empty_page()),
            MockAI::new().rejecting(429),
        ),
        harness_with(
            MockPageFetcher::new().with_page("https://busy.test/", &empty_page()),
            MockAI::new().rejecting(502),
        ),
    ];
    let payload = serde_json::to_vec(&request("https://busy.test/")).unwrap();

    for ctx in cases {
        assert_eq!(ctx.consumer().handle_payload(&payload).await, MessageOutcome::Retry);
    }
}

#[tokio::test]
async fn consumer_drops_permanent_failures() {
    let cases = [
        (
            "https://gone.test/",
            harness_with(
                MockPageFetcher::new().with_status("https://gone.test/", 404, "Not found"),
                MockAI::new(),
            ),
        ),
        (
            "ftp://acme.test/file",
            harness_with(MockPageFetcher::new(), MockAI::new()),
        ),
        (
            EMPTY_URL,
            harness_with(
                MockPageFetcher::new().with_page(EMPTY_URL, &empty_page()),
                MockAI::new().rejecting(401),
            ),
        ),
    ];

    for (url, ctx) in cases {
        let payload = serde_json::to_vec(&request(url)).unwrap();
        assert_eq!(
            ctx.consumer().handle_payload(&payload).await,
            MessageOutcome::Reject,
            "{url}"
        );
        assert!(ctx.deps.kv.puts().is_empty());
        assert!(ctx.deps.email.sent().is_empty());
    }
}

#[tokio::test]
async fn consumer_rejects_undecodable_payloads() {
    let ctx = harness_with(MockPageFetcher::new(), MockAI::new());

    for payload in [&b"garbage"[..], &br#"{"url": "https://acme.test/"}"#[..]] {
        assert_eq!(ctx.consumer().handle_payload(payload).await, MessageOutcome::Reject);
    }
    assert!(ctx.deps.fetcher.calls().is_empty());
}
