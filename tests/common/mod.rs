//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use lexcheck_client::{AnalysisClient, ClientOptions, RetryPolicy, parse_endpoint};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Retry policy with the default attempt count and a short delay.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        delay: Duration::from_millis(20),
    }
}

pub fn client_for(endpoint: &str) -> AnalysisClient {
    AnalysisClient::new(ClientOptions {
        endpoint: parse_endpoint(endpoint).unwrap(),
        connect_timeout: Duration::from_secs(1),
        request_timeout: Duration::from_secs(5),
        retry: fast_retry(),
    })
    .unwrap()
}

pub fn mock_endpoint(server: &MockServer) -> String {
    format!("{}/analyze", server.uri())
}

/// Address on localhost with nothing listening.
pub fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/analyze")
}

/// A complete response as the analysis server sends it.
pub fn sample_report() -> Value {
    json!({
        "rag_analysis": {
            "keywords": ["personal data", "retention"],
            "summary": [
                "Customer data is retained for 30 days.",
                "Users can request deletion."
            ],
            "related_context": "GDPR Art. 17 grants a right to erasure."
        },
        "legal_analysis": {
            "compliance": {
                "applicable_laws": ["GDPR", "CCPA"],
                "compliance_score": 0.75,
                "risk_level": "medium"
            },
            "recommendations": {
                "general_assessment": "The policy is largely compliant.",
                "specific_recommendations": ["Document the legal basis for processing."]
            },
            "privacy_score": 0.8,
            "risk_assessment": {"threshold": 0.6, "is_high_risk": false}
        }
    })
}

/// Mount a 200 response with `body` on `POST /analyze`.
pub async fn mount_report(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
