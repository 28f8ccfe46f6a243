use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Legal domain the backend evaluates a document against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisDomain {
    #[default]
    Privacy,
    IntellectualProperty,
    Contract,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown analysis domain '{0}' (expected privacy, intellectual_property or contract)")]
pub struct DomainParseError(pub String);

impl AnalysisDomain {
    pub const ALL: [Self; 3] = [Self::Privacy, Self::IntellectualProperty, Self::Contract];

    /// Wire name sent in the request body.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Privacy => "privacy",
            Self::IntellectualProperty => "intellectual_property",
            Self::Contract => "contract",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Privacy => "Privacy",
            Self::IntellectualProperty => "Intellectual property",
            Self::Contract => "Contract",
        }
    }
}

impl fmt::Display for AnalysisDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisDomain {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|domain| domain.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| DomainParseError(needle.to_string()))
    }
}
