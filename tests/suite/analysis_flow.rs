//! End-to-end flow: document intake, request, session, rendering, saving.

use std::time::Instant;

use lexcheck_client::AnalyzeError;
use lexcheck_engine::config::Overrides;
use lexcheck_engine::persist::RESULTS_FILE;
use lexcheck_engine::{
    BannerKind, Phase, Session, Settings, TextSource, load_document, save_results,
};
use lexcheck_tui::{RenderOptions, plain_report};
use lexcheck_types::{AnalysisDomain, AnalyzeRequest, NonEmptyString};
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, closed_endpoint, mock_endpoint, mount_report, sample_report};

#[tokio::test]
async fn file_is_analyzed_rendered_and_saved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "text": "We keep customer data for 30 days.",
            "domain": "contract",
            "use_professional_kb": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_report()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let doc_path = dir.path().join("Policy.TXT");
    std::fs::write(&doc_path, "  We keep customer data for 30 days.\n").unwrap();

    let document = load_document(&TextSource::File(doc_path)).unwrap();
    let request =
        AnalyzeRequest::new(document.text, AnalysisDomain::Contract).with_professional_kb(true);
    let client = client_for(&mock_endpoint(&server));

    let now = Instant::now();
    let mut session = Session::new(client.endpoint().as_str());
    session.begin(client.retry_policy().attempts(), now).unwrap();
    let result = client.analyze(&request, |_| {}).await;
    session.finish(result, now);

    let Phase::Done(analysis) = session.phase() else {
        panic!("expected Done, got {:?}", session.phase());
    };
    assert_eq!(session.banner().unwrap().kind, BannerKind::Success);

    let plain = plain_report(&analysis.report, &RenderOptions::default());
    assert!(plain.starts_with("Risk score: 25.0% (medium risk)"));
    assert!(plain.contains("Compliance score: 75.0%"));
    assert!(plain.contains("[personal data] [retention]"));
    assert!(plain.contains("Privacy score: 80.0%"));
    assert!(!plain.contains("right to erasure"));

    let out = dir.path().join("analysis_output");
    let saved = save_results(&out, &analysis.raw).unwrap();
    assert_eq!(saved, out.join(RESULTS_FILE));
    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(saved).unwrap()).unwrap();
    assert_eq!(on_disk, sample_report());
}

#[tokio::test]
async fn endpoint_from_environment_value_is_used() {
    let server = MockServer::start().await;
    mount_report(&server, json!({"rag_analysis": {"keywords": ["nda"]}})).await;

    let settings = Settings::resolve(None, Some(mock_endpoint(&server)), &Overrides::default())
        .unwrap();
    assert_eq!(settings.domain, AnalysisDomain::Privacy);

    let client = lexcheck_client::AnalysisClient::new(settings.client).unwrap();
    let request = AnalyzeRequest::new(NonEmptyString::new("nda text").unwrap(), settings.domain);
    let analysis = client.analyze(&request, |_| {}).await.unwrap();
    assert_eq!(analysis.report.keywords(), Some(&["nda".to_string()][..]));
}

#[tokio::test]
async fn server_error_detail_reaches_the_banner() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Text is required"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&mock_endpoint(&server));
    let request = AnalyzeRequest::new(NonEmptyString::new("x").unwrap(), AnalysisDomain::Privacy);
    let now = Instant::now();
    let mut session = Session::new(client.endpoint().as_str());
    session.begin(3, now).unwrap();
    let result = client.analyze(&request, |_| {}).await;
    assert!(matches!(
        &result,
        Err(AnalyzeError::Server { message: Some(m), .. }) if m == "Text is required"
    ));
    session.finish(result, now);

    let banner = session.banner().unwrap();
    assert_eq!(banner.kind, BannerKind::Error);
    assert!(banner.text.starts_with("Analysis failed: "));
    assert!(banner.text.contains("Text is required"));
    assert!(session.report().is_none());
}

#[tokio::test]
async fn object_detail_message_is_extracted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "detail": {"type": "KeyError", "message": "missing field 'text'"},
            "error": "internal"
        })))
        .mount(&server)
        .await;

    let client = client_for(&mock_endpoint(&server));
    let request = AnalyzeRequest::new(NonEmptyString::new("x").unwrap(), AnalysisDomain::Privacy);
    match client.analyze(&request, |_| {}).await {
        Err(AnalyzeError::Server { status, message }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(message.as_deref(), Some("missing field 'text'"));
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_message_names_endpoint() {
    let endpoint = closed_endpoint();
    let client = client_for(&endpoint);
    let request = AnalyzeRequest::new(NonEmptyString::new("x").unwrap(), AnalysisDomain::Privacy);

    let now = Instant::now();
    let mut session = Session::new(client.endpoint().as_str());
    session.begin(client.retry_policy().attempts(), now).unwrap();
    let result = client
        .analyze(&request, |notice| session.on_retry(notice, now))
        .await;
    session.finish(result, now);

    match session.phase() {
        Phase::Failed { message, transient } => {
            assert!(transient);
            assert!(message.contains(&endpoint), "{message}");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}
