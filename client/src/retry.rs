//! Fixed-delay retry for transport failures.
//!
//! # Retry Policy
//!
//! - Max attempts: 3 (initial request included)
//! - Delay: 1 second between attempts, no backoff, no jitter
//!
//! # Retryable Conditions
//!
//! Only failures where no HTTP response arrived at all: connection refused,
//! DNS failure, timeouts. Any response, including 4xx and 5xx, ends the loop
//! and is handed back to the caller untouched.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Pause between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Emitted before sleeping ahead of a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryNotice {
    /// 1-based number of the attempt that just failed.
    pub failed_attempt: u32,
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryNotice {
    /// 1-based number of the attempt about to be made.
    #[must_use]
    pub const fn next_attempt(&self) -> u32 {
        self.failed_attempt + 1
    }
}

/// Outcome of a retried send.
///
/// A response is returned whatever its status; only the absence of a response
/// is an error here.
#[derive(Debug)]
pub enum RetryOutcome {
    Response(Response),
    /// Every attempt failed at the transport level.
    ConnectionError {
        attempts: u32,
        source: reqwest::Error,
    },
    /// Transport failure that retrying cannot fix (e.g. a malformed request),
    /// whichever attempt it happened on.
    NonRetryable(reqwest::Error),
}

/// Send a request, retrying transport failures according to `policy`.
///
/// `build_request` is called once per attempt. `on_retry` is told about each
/// retry before the delay starts.
pub async fn send_with_retry<F, O>(
    build_request: F,
    policy: &RetryPolicy,
    mut on_retry: O,
) -> RetryOutcome
where
    F: Fn() -> RequestBuilder,
    O: FnMut(RetryNotice),
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match build_request().send().await {
            Ok(response) => {
                tracing::debug!(status = %response.status(), attempt, "Received response");
                return RetryOutcome::Response(response);
            }
            Err(e) if !is_retryable_error(&e) => {
                tracing::warn!(error = %e, attempt, "Request failed without a retryable cause");
                return RetryOutcome::NonRetryable(e);
            }
            Err(e) if attempt >= max_attempts => {
                tracing::warn!(error = %e, attempts = attempt, "Giving up after connection errors");
                return RetryOutcome::ConnectionError {
                    attempts: attempt,
                    source: e,
                };
            }
            Err(e) => {
                let notice = RetryNotice {
                    failed_attempt: attempt,
                    max_attempts,
                    delay: policy.delay,
                };
                tracing::debug!(
                    error = %e,
                    retry_count = attempt,
                    delay_ms = policy.delay.as_millis(),
                    "Retrying request after connection error"
                );
                on_retry(notice);
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request()
}
