//! Core domain types for lexcheck.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies:
//! the `/analyze` request and response models, the analysis domain, risk scoring,
//! and terminal text sanitization.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod domain;
mod report;
mod risk;
mod sanitize;

pub use domain::{AnalysisDomain, DomainParseError};
pub use report::{
    AnalysisReport, AnalyzeRequest, Compliance, ErrorBody, LegalAnalysis, RagAnalysis,
    Recommendations, RiskAssessmentFlags,
};
pub use risk::{ComplianceScore, RiskAssessment, RiskBand, format_percent};
pub use sanitize::sanitize_terminal_text;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Presentation toggles shared by the engine and the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    /// Use ASCII-only glyphs for bullets, tags and the spinner.
    pub ascii_only: bool,
    /// Use the high-contrast palette.
    pub high_contrast: bool,
}

// ============================================================================
// NonEmpty String Types
// ============================================================================

/// A string guaranteed to be non-empty (after trimming).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("text must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    /// Trim surrounding whitespace, rejecting text that is empty afterwards.
    pub fn trimmed(value: &str) -> Result<Self, EmptyStringError> {
        Self::new(value.trim())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::ops::Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
