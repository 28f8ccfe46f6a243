//! Client for the document analysis service.
//!
//! # Architecture
//!
//! - [`AnalysisClient`] owns a configured [`reqwest::Client`] and the `/analyze` endpoint.
//! - [`retry`] implements the fixed-delay retry loop for transport failures.
//!
//! # Error Handling
//!
//! Two kinds of failure are kept apart:
//!
//! | Kind | Variant | Retried |
//! |------|---------|---------|
//! | No response (connect/timeout) | [`AnalyzeError::Unreachable`] | yes, up to the policy limit |
//! | Non-2xx response | [`AnalyzeError::Server`] | no |
//! | 2xx with a body that is not a report | [`AnalyzeError::Decode`] | no |

pub mod retry;

use std::time::Duration;

use lexcheck_types::{AnalysisReport, AnalyzeRequest, ErrorBody};
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

pub use lexcheck_types;
pub use retry::{RetryNotice, RetryOutcome, RetryPolicy, send_with_retry};

/// Where the analysis server listens out of the box.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/analyze";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const TCP_KEEPALIVE_SECS: u64 = 60;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid analysis endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("could not reach the analysis server after {attempts} attempts: {source}")]
    Unreachable {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("{}", server_error_text(.status, .message))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("malformed analysis response: {0}")]
    Decode(String),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

fn server_error_text(status: &StatusCode, message: &Option<String>) -> String {
    match message {
        Some(message) => format!("server returned {status}: {message}"),
        None => format!("server returned {status}"),
    }
}

impl AnalyzeError {
    /// True for network-level failures, the only kind the retry loop handles.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// A decoded report together with the exact JSON the server sent.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: AnalysisReport,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub endpoint: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

/// Parse and validate an `/analyze` URL.
pub fn parse_endpoint(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| ClientError::InvalidEndpoint {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::InvalidEndpoint {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn client_builder(options: &ClientOptions) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(concat!("lexcheck/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(options.connect_timeout)
        .timeout(options.request_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
}

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: Url,
    retry: RetryPolicy,
}

impl AnalysisClient {
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        let http = client_builder(&options).build().map_err(ClientError::Build)?;
        Ok(Self {
            http,
            endpoint: options.endpoint,
            retry: options.retry,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Submit a document for analysis.
    ///
    /// `on_retry` is invoked before every retry so the caller can tell the user
    /// a reconnect is in progress.
    pub async fn analyze<O>(
        &self,
        request: &AnalyzeRequest,
        on_retry: O,
    ) -> Result<Analysis, AnalyzeError>
    where
        O: FnMut(RetryNotice),
    {
        tracing::info!(
            endpoint = %self.endpoint,
            domain = %request.domain,
            chars = request.text.chars().count(),
            "Submitting document for analysis"
        );

        let outcome = send_with_retry(
            || self.http.post(self.endpoint.clone()).json(request),
            &self.retry,
            on_retry,
        )
        .await;

        let response = match outcome {
            RetryOutcome::Response(response) => response,
            RetryOutcome::ConnectionError { attempts, source } => {
                return Err(AnalyzeError::Unreachable { attempts, source });
            }
            RetryOutcome::NonRetryable(e) => return Err(AnalyzeError::Transport(e)),
        };

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            let message = body.message();
            tracing::warn!(status = %status, message = ?message, "Analysis request rejected");
            if message.is_none() && !body.bytes.is_empty() {
                tracing::debug!(body = %body.text(), "Error body carried no message");
            }
            return Err(AnalyzeError::Server { status, message });
        }

        let bytes = response.bytes().await.map_err(AnalyzeError::Transport)?;
        decode_analysis(&bytes)
    }
}

/// Decode a 2xx body into a report, keeping the raw JSON alongside it.
pub fn decode_analysis(bytes: &[u8]) -> Result<Analysis, AnalyzeError> {
    let raw: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| AnalyzeError::Decode(e.to_string()))?;
    if !raw.is_object() {
        return Err(AnalyzeError::Decode(format!(
            "expected a JSON object, got {}",
            json_kind(&raw)
        )));
    }
    let report: AnalysisReport =
        serde_json::from_value(raw.clone()).map_err(|e| AnalyzeError::Decode(e.to_string()))?;
    Ok(Analysis { report, raw })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Error body read up to [`MAX_ERROR_BODY_BYTES`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CappedBody {
    pub bytes: Vec<u8>,
    /// The server sent more than the cap; `bytes` holds only the prefix.
    pub truncated: bool,
}

impl CappedBody {
    /// Message from an [`ErrorBody`]. A truncated body is cut mid-document and
    /// never yields one.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        if self.truncated {
            return None;
        }
        serde_json::from_slice::<ErrorBody>(&self.bytes)
            .ok()
            .and_then(|b| b.message())
    }

    /// Lossy text for logging, marked when cut off.
    #[must_use]
    pub fn text(&self) -> String {
        let text = String::from_utf8_lossy(&self.bytes);
        if self.truncated {
            format!("{text}...(truncated)")
        } else {
            text.into_owned()
        }
    }
}

/// Read an error body, dropping anything past 32 KiB.
pub async fn read_capped_error_body(response: reqwest::Response) -> CappedBody {
    use futures_util::StreamExt;
    let mut body = CappedBody::default();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.bytes.extend_from_slice(&chunk);
        if body.bytes.len() > MAX_ERROR_BODY_BYTES {
            body.bytes.truncate(MAX_ERROR_BODY_BYTES);
            body.truncated = true;
            break;
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_endpoint_accepts_http_and_https() {
        assert!(parse_endpoint("http://127.0.0.1:5000/analyze").is_ok());
        assert!(parse_endpoint(" https://analysis.example/analyze ").is_ok());
    }

    #[test]
    fn parse_endpoint_rejects_other_schemes_and_garbage() {
        assert!(matches!(
            parse_endpoint("ftp://host/analyze"),
            Err(ClientError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            parse_endpoint("not a url"),
            Err(ClientError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn decode_rejects_non_objects() {
        let err = decode_analysis(b"[1, 2]").unwrap_err();
        assert!(err.to_string().contains("an array"), "{err}");
        assert!(matches!(decode_analysis(b"not json"), Err(AnalyzeError::Decode(_))));
    }

    #[test]
    fn decode_rejects_wrong_field_types() {
        let err = decode_analysis(br#"{"rag_analysis": {"keywords": "data"}}"#).unwrap_err();
        assert!(matches!(err, AnalyzeError::Decode(_)));
    }

    #[test]
    fn decode_keeps_raw_json() {
        let analysis =
            decode_analysis(br#"{"rag_analysis": {"keywords": ["a"]}, "x": 1}"#).unwrap();
        assert_eq!(analysis.raw["x"], serde_json::json!(1));
        assert_eq!(analysis.report.keywords(), Some(&["a".to_string()][..]));
    }

    #[test]
    fn capped_body_message_comes_from_untouched_bytes() {
        let body = CappedBody {
            bytes: br#"{"detail": "text is required"}"#.to_vec(),
            truncated: false,
        };
        assert_eq!(body.message().as_deref(), Some("text is required"));
        assert_eq!(body.text(), r#"{"detail": "text is required"}"#);
    }

    #[test]
    fn truncated_body_has_no_message_but_marked_text() {
        let body = CappedBody {
            bytes: br#"{"detail": "text is required", "trace": "#.to_vec(),
            truncated: true,
        };
        assert_eq!(body.message(), None);
        assert!(body.text().ends_with("...(truncated)"));
    }

    #[test]
    fn server_error_display_includes_message() {
        let err = AnalyzeError::Server {
            status: StatusCode::BAD_REQUEST,
            message: Some("text is required".to_string()),
        };
        assert_eq!(err.to_string(), "server returned 400 Bad Request: text is required");
        assert!(!err.is_transient());
    }
}
