//! Metric identifiers and metric selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result, ValidationErrorCode};

/// Business measurement an event belongs to.
///
/// Variants are declared in identifier order so the derived `Ord` matches
/// lexical ordering of the serialized names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Conversion,
    Engagement,
    Revenue,
    Sales,
    Traffic,
    Users,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Self::Conversion,
        Self::Engagement,
        Self::Revenue,
        Self::Sales,
        Self::Traffic,
        Self::Users,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversion => "conversion",
            Self::Engagement => "engagement",
            Self::Revenue => "revenue",
            Self::Sales => "sales",
            Self::Traffic => "traffic",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| {
                Error::invalid_parameter(
                    ValidationErrorCode::UnknownMetric,
                    format!(
                        "unknown metric '{}', expected one of: all, {}",
                        s.trim(),
                        Self::ALL.map(|m| m.as_str()).join(", ")
                    ),
                )
            })
    }
}

/// Which events a chart includes, by metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricSelector {
    /// The `all` sentinel: no metric filter.
    All,
    Metric(Metric),
    /// A name outside the metric enum, accepted on the lenient path.
    /// Matches no event.
    Unrecognized(String),
}

impl MetricSelector {
    pub const ALL_SENTINEL: &'static str = "all";

    /// Rejects names that are neither `all` nor a known metric.
    pub fn strict(raw: &str) -> Result<Self> {
        if raw.trim().eq_ignore_ascii_case(Self::ALL_SENTINEL) {
            return Ok(Self::All);
        }
        raw.parse().map(Self::Metric)
    }

    /// Never fails; unknown names select nothing.
    pub fn lenient(raw: &str) -> Self {
        Self::strict(raw).unwrap_or_else(|_| Self::Unrecognized(raw.trim().to_string()))
    }

    pub fn matches(&self, metric: Metric) -> bool {
        match self {
            Self::All => true,
            Self::Metric(selected) => *selected == metric,
            Self::Unrecognized(_) => false,
        }
    }

    /// The metric to push down into the store filter, if any.
    pub fn metric(&self) -> Option<Metric> {
        match self {
            Self::Metric(metric) => Some(*metric),
            _ => None,
        }
    }

    /// Label echoed back in chart responses.
    pub fn label(&self) -> &str {
        match self {
            Self::All => Self::ALL_SENTINEL,
            Self::Metric(metric) => metric.as_str(),
            Self::Unrecognized(raw) => raw,
        }
    }
}
