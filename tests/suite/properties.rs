//! Behavioural guarantees of the client as a whole.

use std::path::Path;
use std::time::{Duration, Instant};

use lexcheck_client::{Analysis, AnalysisClient, AnalyzeError, ClientOptions, parse_endpoint};
use lexcheck_engine::{IntakeError, Session, TextSource, load_document};
use lexcheck_tui::{Palette, RenderOptions, draw_inline, plain_report, report_lines};
use lexcheck_types::{AnalysisDomain, AnalyzeRequest, NonEmptyString, RiskAssessment, RiskBand};
use ratatui::{Terminal, backend::TestBackend};
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{client_for, closed_endpoint, fast_retry, mock_endpoint, mount_report};

fn request() -> AnalyzeRequest {
    AnalyzeRequest::new(
        NonEmptyString::new("Personal data is shared with partners.").unwrap(),
        AnalysisDomain::Privacy,
    )
}

#[derive(Debug)]
enum FileRunError {
    Intake(IntakeError),
    Analyze(AnalyzeError),
}

/// Intake followed by the request, in the order the binary runs them.
async fn analyze_file(client: &AnalysisClient, file: &Path) -> Result<Analysis, FileRunError> {
    let document =
        load_document(&TextSource::File(file.to_path_buf())).map_err(FileRunError::Intake)?;
    let request = AnalyzeRequest::new(document.text, AnalysisDomain::Privacy);
    client
        .analyze(&request, |_| {})
        .await
        .map_err(FileRunError::Analyze)
}

#[tokio::test]
async fn unsupported_extension_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    let client = client_for(&mock_endpoint(&server));

    let dir = tempdir().unwrap();
    for name in ["contract.pdf", "terms.rtf", "notes", "scan.docx.png"] {
        let file = dir.path().join(name);
        std::fs::write(&file, "some text").unwrap();
        let err = analyze_file(&client, &file).await.unwrap_err();
        assert!(
            matches!(
                err,
                FileRunError::Intake(IntakeError::UnsupportedExtension { ref path })
                    if path.ends_with(Path::new(name))
            ),
            "{name}: {err:?}"
        );
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn supported_extension_is_sent_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"rag_analysis": {"summary": ["ok"]}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&mock_endpoint(&server));

    let dir = tempdir().unwrap();
    let file = dir.path().join("policy.TXT");
    std::fs::write(&file, "Personal data is shared with partners.").unwrap();

    let analysis = analyze_file(&client, &file).await.unwrap();

    assert_eq!(analysis.report.summary(), Some(&["ok".to_string()][..]));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn connection_refused_makes_exactly_three_attempts() {
    let client = client_for(&closed_endpoint());
    let mut notices = Vec::new();

    let err = client
        .analyze(&request(), |notice| notices.push(notice.failed_attempt))
        .await
        .unwrap_err();

    match err {
        AnalyzeError::Unreachable { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected Unreachable, got {other:?}"),
    }
    assert_eq!(notices, vec![1, 2]);
}

#[tokio::test]
async fn timed_out_attempts_are_retried_three_times() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .expect(3)
        .mount(&server)
        .await;

    let client = AnalysisClient::new(ClientOptions {
        endpoint: parse_endpoint(&mock_endpoint(&server)).unwrap(),
        connect_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_millis(150),
        retry: fast_retry(),
    })
    .unwrap();

    let err = client.analyze(&request(), |_| {}).await.unwrap_err();
    assert!(err.is_transient(), "{err}");
}

#[tokio::test]
async fn http_error_status_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&mock_endpoint(&server));
    let mut retried = false;
    let err = client
        .analyze(&request(), |_| retried = true)
        .await
        .unwrap_err();
    assert!(!retried);
    assert!(!err.is_transient());
}

#[tokio::test]
async fn compliance_of_three_quarters_is_yellow_75_percent() {
    let server = MockServer::start().await;
    mount_report(
        &server,
        json!({"legal_analysis": {"compliance": {"compliance_score": 0.75}}}),
    )
    .await;

    let client = client_for(&mock_endpoint(&server));
    let analysis = client.analyze(&request(), |_| {}).await.unwrap();

    let risk = RiskAssessment::from_report(&analysis.report);
    assert_eq!(risk.band(), RiskBand::Medium);

    let lines = report_lines(&analysis.report, &RenderOptions::default());
    let compliance = lines
        .iter()
        .find(|l| l.spans.iter().any(|s| s.content == "Compliance score: "))
        .unwrap();
    let value = compliance.spans.last().unwrap();
    assert_eq!(value.content, "75.0%");
    assert_eq!(value.style.fg, Some(Palette::standard().yellow));

    let now = Instant::now();
    let mut session = Session::new(client.endpoint().as_str());
    session.begin(3, now).unwrap();
    session.finish(Ok(analysis), now);

    let mut terminal = Terminal::new(TestBackend::new(40, 3)).unwrap();
    terminal
        .draw(|frame| draw_inline(frame, &session, &RenderOptions::default()))
        .unwrap();
    let buffer = terminal.backend().buffer();
    let gauge_row: String = (0..40u16).map(|x| buffer[(x, 2)].symbol()).collect();
    assert!(gauge_row.starts_with("Risk score: 25.0%"), "{gauge_row}");
    let yellow = Palette::standard().yellow;
    assert!((0..40u16).any(|x| buffer[(x, 2)].symbol() == "█" && buffer[(x, 2)].fg == yellow));
}

#[tokio::test]
async fn sparse_responses_render_without_error() {
    for body in [
        json!({}),
        json!({"rag_analysis": {}}),
        json!({"rag_analysis": {"keywords": null, "summary": ["Only a summary."]}}),
        json!({"legal_analysis": {"compliance": {"risk_level": "high"}}}),
        json!({
            "legal_analysis": {"recommendations": {"specific_recommendations": []}},
            "extra": 1
        }),
    ] {
        let server = MockServer::start().await;
        mount_report(&server, body.clone()).await;
        let client = client_for(&mock_endpoint(&server));

        let analysis = client.analyze(&request(), |_| {}).await.unwrap();
        let plain = plain_report(&analysis.report, &RenderOptions::default());
        assert!(!plain.is_empty(), "{body}");

        let now = Instant::now();
        let mut session = Session::new(client.endpoint().as_str());
        session.begin(3, now).unwrap();
        session.finish(Ok(analysis), now);
        let mut terminal = Terminal::new(TestBackend::new(30, 3)).unwrap();
        terminal
            .draw(|frame| draw_inline(frame, &session, &RenderOptions::default()))
            .unwrap();
    }
}
