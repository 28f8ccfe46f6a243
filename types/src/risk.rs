//! Compliance-to-risk conversion and colour banding.

use crate::AnalysisReport;

/// Compliance score normalised to `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ComplianceScore(f64);

impl ComplianceScore {
    pub const ZERO: Self = Self(0.0);

    /// Normalise a backend-provided score.
    ///
    /// Values above 1 and up to 100 are percentages and are scaled down.
    /// NaN becomes 0; everything else is clamped.
    #[must_use]
    pub fn from_raw(raw: f64) -> Self {
        if raw.is_nan() {
            return Self::ZERO;
        }
        let fraction = if raw > 1.0 && raw <= 100.0 {
            raw / 100.0
        } else {
            raw
        };
        Self(fraction.clamp(0.0, 1.0))
    }

    #[must_use]
    pub const fn fraction(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn percent(self) -> f64 {
        self.0 * 100.0
    }
}

/// Traffic-light band for a compliance percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    /// Compliance at or above 80%.
    Low,
    /// Compliance at or above 60%.
    Medium,
    High,
}

impl RiskBand {
    #[must_use]
    pub fn from_compliance_percent(percent: f64) -> Self {
        if percent >= 80.0 {
            Self::Low
        } else if percent >= 60.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Displayed risk derived from a report's compliance score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub compliance: ComplianceScore,
    /// False when the backend omitted the score and compliance defaulted to 0.
    pub scored: bool,
}

impl RiskAssessment {
    #[must_use]
    pub fn from_report(report: &AnalysisReport) -> Self {
        match report.compliance().and_then(|c| c.compliance_score) {
            Some(raw) => Self {
                compliance: ComplianceScore::from_raw(raw),
                scored: true,
            },
            None => Self {
                compliance: ComplianceScore::ZERO,
                scored: false,
            },
        }
    }

    #[must_use]
    pub fn compliance_percent(&self) -> f64 {
        self.compliance.percent()
    }

    /// Risk is the inverse of compliance on a 0-100 scale.
    #[must_use]
    pub fn risk_percent(&self) -> f64 {
        100.0 - self.compliance.percent()
    }

    /// Gauge ratio in `0.0..=1.0`.
    #[must_use]
    pub fn risk_ratio(&self) -> f64 {
        (self.risk_percent() / 100.0).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn band(&self) -> RiskBand {
        RiskBand::from_compliance_percent(self.compliance_percent())
    }
}

/// Format a percentage with one decimal, e.g. `75.0%`.
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Compliance, LegalAnalysis};

    fn report_with_score(score: Option<f64>) -> AnalysisReport {
        AnalysisReport {
            rag_analysis: None,
            legal_analysis: Some(LegalAnalysis {
                compliance: Some(Compliance {
                    compliance_score: score,
                    ..Compliance::default()
                }),
                ..LegalAnalysis::default()
            }),
        }
    }

    #[test]
    fn three_quarters_compliance_is_medium_band() {
        let risk = RiskAssessment::from_report(&report_with_score(Some(0.75)));
        assert_eq!(format_percent(risk.compliance_percent()), "75.0%");
        assert_eq!(format_percent(risk.risk_percent()), "25.0%");
        assert_eq!(risk.band(), RiskBand::Medium);
        assert!(risk.scored);
    }

    #[test]
    fn band_thresholds_are_inclusive() {
        assert_eq!(RiskBand::from_compliance_percent(80.0), RiskBand::Low);
        assert_eq!(RiskBand::from_compliance_percent(79.9), RiskBand::Medium);
        assert_eq!(RiskBand::from_compliance_percent(60.0), RiskBand::Medium);
        assert_eq!(RiskBand::from_compliance_percent(59.9), RiskBand::High);
    }

    #[test]
    fn missing_score_means_full_risk() {
        let risk = RiskAssessment::from_report(&AnalysisReport::default());
        assert!(!risk.scored);
        assert!((risk.risk_percent() - 100.0).abs() < f64::EPSILON);
        assert_eq!(risk.band(), RiskBand::High);

        let risk = RiskAssessment::from_report(&report_with_score(None));
        assert!(!risk.scored);
    }

    #[test]
    fn percentage_scores_are_scaled() {
        assert!((ComplianceScore::from_raw(85.5).fraction() - 0.855).abs() < 1e-9);
        assert!((ComplianceScore::from_raw(1.0).fraction() - 1.0).abs() < f64::EPSILON);
        assert!((ComplianceScore::from_raw(250.0).fraction() - 1.0).abs() < f64::EPSILON);
        assert!(ComplianceScore::from_raw(-0.2).fraction().abs() < f64::EPSILON);
        assert!(ComplianceScore::from_raw(f64::NAN).fraction().abs() < f64::EPSILON);
    }

    #[test]
    fn risk_ratio_is_bounded() {
        let risk = RiskAssessment::from_report(&report_with_score(Some(0.0)));
        assert!((risk.risk_ratio() - 1.0).abs() < f64::EPSILON);
        let risk = RiskAssessment::from_report(&report_with_score(Some(1.0)));
        assert!(risk.risk_ratio().abs() < f64::EPSILON);
    }
}
