//! Analysis session state machine.
//!
//! Transitions:
//!
//! ```text
//! Idle ──begin──> Analyzing ──finish(Ok)──> Done
//!                     │  ▲                    │
//!                on_retry│                 begin
//!                     ▼  │                    ▼
//!                 Analyzing ──finish(Err)─> Failed ──begin──> Analyzing
//! ```
//!
//! Only one request may be in flight; `begin` while `Analyzing` is refused.

use std::time::{Duration, Instant};

use thiserror::Error;

use lexcheck_client::{Analysis, AnalyzeError, RetryNotice};
use lexcheck_types::AnalysisReport;

/// How long non-error banners stay visible.
pub const BANNER_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("an analysis is already in progress")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    pub shown_at: Instant,
}

impl Banner {
    /// Error banners persist until replaced; others expire after [`BANNER_TTL`].
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.kind != BannerKind::Error && now.saturating_duration_since(self.shown_at) >= BANNER_TTL
    }
}

#[derive(Debug, Clone)]
pub enum Phase {
    Idle,
    Analyzing {
        started: Instant,
        /// 1-based attempt currently in flight.
        attempt: u32,
        max_attempts: u32,
    },
    Done(Box<Analysis>),
    Failed {
        message: String,
        transient: bool,
    },
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    banner: Option<Banner>,
    tick: usize,
    endpoint: String,
}

impl Session {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            phase: Phase::Idle,
            banner: None,
            tick: 0,
            endpoint: endpoint.into(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    #[must_use]
    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Analyzing { .. })
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Done(_) | Phase::Failed { .. })
    }

    /// The report of a completed analysis. Cleared when a new one starts.
    #[must_use]
    pub fn report(&self) -> Option<&AnalysisReport> {
        match &self.phase {
            Phase::Done(analysis) => Some(&analysis.report),
            _ => None,
        }
    }

    #[must_use]
    pub fn analysis(&self) -> Option<&Analysis> {
        match &self.phase {
            Phase::Done(analysis) => Some(analysis),
            _ => None,
        }
    }

    /// Start an analysis, discarding previous results.
    pub fn begin(&mut self, max_attempts: u32, now: Instant) -> Result<(), SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        self.phase = Phase::Analyzing {
            started: now,
            attempt: 1,
            max_attempts: max_attempts.max(1),
        };
        self.banner = None;
        tracing::debug!(endpoint = %self.endpoint, "Analysis started");
        Ok(())
    }

    pub fn on_retry(&mut self, notice: RetryNotice, now: Instant) {
        if let Phase::Analyzing { attempt, .. } = &mut self.phase {
            *attempt = notice.next_attempt();
        }
        self.show_banner(
            BannerKind::Info,
            format!(
                "Connection failed, retrying ({}/{})...",
                notice.failed_attempt, notice.max_attempts
            ),
            now,
        );
    }

    pub fn finish(&mut self, result: Result<Analysis, AnalyzeError>, now: Instant) {
        match result {
            Ok(analysis) => {
                self.phase = Phase::Done(Box::new(analysis));
                self.show_banner(BannerKind::Success, "Analysis complete".to_string(), now);
            }
            Err(err) => {
                let transient = err.is_transient();
                let message = if transient {
                    format!(
                        "Cannot reach the analysis server at {}; make sure it is running",
                        self.endpoint
                    )
                } else {
                    format!("Analysis failed: {err}")
                };
                tracing::warn!(error = %err, "Analysis failed");
                self.show_banner(BannerKind::Error, message.clone(), now);
                self.phase = Phase::Failed { message, transient };
            }
        }
    }

    pub fn show_banner(&mut self, kind: BannerKind, text: String, now: Instant) {
        self.banner = Some(Banner {
            kind,
            text,
            shown_at: now,
        });
    }

    /// Advance the spinner and drop expired banners.
    pub fn tick(&mut self, now: Instant) {
        self.tick = self.tick.wrapping_add(1);
        if self.banner.as_ref().is_some_and(|b| b.is_expired(now)) {
            self.banner = None;
        }
    }
}
