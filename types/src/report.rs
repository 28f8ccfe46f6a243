//! Wire models for the `/analyze` endpoint.
//!
//! The response schema is owned by the backend. Every field is optional and
//! unknown fields are ignored, so a partial or older backend still renders.

use serde::{Deserialize, Serialize};

use crate::{AnalysisDomain, NonEmptyString};

/// Body of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeRequest {
    pub text: NonEmptyString,
    pub domain: AnalysisDomain,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_professional_kb: Option<bool>,
}

impl AnalyzeRequest {
    #[must_use]
    pub fn new(text: NonEmptyString, domain: AnalysisDomain) -> Self {
        Self {
            text,
            domain,
            use_professional_kb: None,
        }
    }

    #[must_use]
    pub fn with_professional_kb(mut self, enabled: bool) -> Self {
        self.use_professional_kb = Some(enabled);
        self
    }
}

/// Successful `/analyze` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_analysis: Option<RagAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_analysis: Option<LegalAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<String>>,
    /// Knowledge-base passages the backend retrieved for the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_context: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegalAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<Compliance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Recommendations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<RiskAssessmentFlags>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compliance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicable_laws: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_assessment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_recommendations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessmentFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_high_risk: Option<bool>,
}

impl AnalysisReport {
    #[must_use]
    pub fn keywords(&self) -> Option<&[String]> {
        self.rag_analysis.as_ref()?.keywords.as_deref()
    }

    #[must_use]
    pub fn summary(&self) -> Option<&[String]> {
        self.rag_analysis.as_ref()?.summary.as_deref()
    }

    #[must_use]
    pub fn related_context(&self) -> Option<&str> {
        self.rag_analysis.as_ref()?.related_context.as_deref()
    }

    #[must_use]
    pub fn compliance(&self) -> Option<&Compliance> {
        self.legal_analysis.as_ref()?.compliance.as_ref()
    }

    #[must_use]
    pub fn recommendations(&self) -> Option<&Recommendations> {
        self.legal_analysis.as_ref()?.recommendations.as_ref()
    }
}

/// Body of a non-2xx `/analyze` response.
///
/// `detail` is a plain string in the documented contract, but some servers send
/// an object such as `{"type": "KeyError", "message": "..."}` next to an `error` string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message carried by the body, if any.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        let from_detail = match &self.detail {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Object(map)) => map
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
            _ => None,
        };
        from_detail
            .or_else(|| self.error.clone())
            .filter(|s| !s.trim().is_empty())
    }
}
