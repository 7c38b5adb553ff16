//! Query parameter coercion.
//!
//! Call sites differ in tolerance, so every parameter has a lenient path that
//! falls back to a default and a strict path that rejects bad input.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ValidationErrorCode};
use crate::limits::{DEFAULT_DAYS_BACK, MAX_DAYS_BACK};

/// A positive look-back in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaysBack(u32);

impl Default for DaysBack {
    fn default() -> Self {
        Self(DEFAULT_DAYS_BACK)
    }
}

impl DaysBack {
    /// Accepts `1..=MAX_DAYS_BACK`.
    pub fn new(days: u32) -> Result<Self> {
        if days == 0 || days > MAX_DAYS_BACK {
            return Err(Error::invalid_parameter(
                ValidationErrorCode::InvalidParameter,
                format!("days must be between 1 and {}, got {}", MAX_DAYS_BACK, days),
            ));
        }
        Ok(Self(days))
    }

    /// Missing input means the default; anything else must be a valid day count.
    pub fn strict(raw: Option<&str>) -> Result<Self> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };

        let days: i64 = raw.parse().map_err(|_| {
            Error::invalid_parameter(
                ValidationErrorCode::InvalidParameter,
                format!("days must be a positive integer, got '{}'", raw),
            )
        })?;

        let days = u32::try_from(days).map_err(|_| {
            Error::invalid_parameter(
                ValidationErrorCode::InvalidParameter,
                format!("days must be between 1 and {}, got {}", MAX_DAYS_BACK, days),
            )
        })?;

        Self::new(days)
    }

    /// Reads the leading integer (`"7days"` is 7, `"1.5"` is 1). Anything
    /// without one, or below 1, falls back to the default; large values are
    /// clamped to `MAX_DAYS_BACK`.
    pub fn lenient(raw: Option<&str>) -> Self {
        match raw.and_then(leading_integer) {
            Some(days) if days >= 1 => Self(days.min(i64::from(MAX_DAYS_BACK)) as u32),
            _ => Self::default(),
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Human-readable period, e.g. `"30 days"`.
    pub fn period_label(self) -> String {
        period_label(self.0)
    }
}

pub fn period_label(days: u32) -> String {
    format!("{} days", days)
}

/// Optional sign and the digits that follow, after leading whitespace.
/// Overlong digit runs saturate.
fn leading_integer(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end]
        .bytes()
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    Some(if negative { -magnitude } else { magnitude })
}

/// Parses an optional boolean flag such as `strict=true`.
pub fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}
