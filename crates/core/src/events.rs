//! Event records and store filters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{Error, Result, ValidationErrorCode};
use crate::limits::{MAX_CATEGORY_LEN, MAX_METADATA_BYTES};
use crate::metric::Metric;
use crate::window::{day_of, DateWindow};

/// Source recorded for events created through the API.
pub const SOURCE_MANUAL: &str = "manual";

/// Source recorded when none is supplied.
pub const SOURCE_SYSTEM: &str = "system";

fn default_source() -> String {
    SOURCE_SYSTEM.to_string()
}

/// A single raw measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub metric: Metric,
    /// Finite; may be negative for adjustments.
    pub value: f64,
    pub category: String,
    pub date: DateTime<Utc>,
    /// Opaque to aggregation.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default = "default_source")]
    pub source: String,
}

impl Event {
    /// Creates an event with a generated ID and the `system` source.
    pub fn new(metric: Metric, value: f64, category: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            metric,
            value,
            category: category.into(),
            date,
            metadata: Map::new(),
            source: default_source(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// UTC calendar day this event is bucketed on.
    pub fn day(&self) -> NaiveDate {
        day_of(self.date)
    }
}

fn validate_category(category: &str) -> std::result::Result<(), ValidationError> {
    if category.trim().is_empty() {
        let mut err = ValidationError::new("category_blank");
        err.message = Some("category must not be blank".into());
        return Err(err);
    }

    let len = category.chars().count();
    if len > MAX_CATEGORY_LEN {
        let mut err = ValidationError::new("category_too_long");
        err.message = Some(
            format!("category has {} chars, limit is {}", len, MAX_CATEGORY_LEN).into(),
        );
        return Err(err);
    }
    Ok(())
}

fn validate_metadata_size(metadata: &Map<String, Value>) -> std::result::Result<(), ValidationError> {
    if metadata.is_empty() {
        return Ok(());
    }

    let size = serde_json::to_vec(metadata).map(|v| v.len()).unwrap_or(0);

    if size > MAX_METADATA_BYTES {
        let mut err = ValidationError::new("metadata_too_large");
        err.message = Some(
            format!(
                "metadata {}KB exceeds {}KB limit",
                size / 1024,
                MAX_METADATA_BYTES / 1024
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Body of a create-metric request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewEvent {
    pub metric: Metric,
    pub value: f64,
    #[validate(custom(function = "validate_category"))]
    pub category: String,
    #[serde(default)]
    #[validate(custom(function = "validate_metadata_size"))]
    pub metadata: Map<String, Value>,
}

impl NewEvent {
    /// Validates the request and stamps it with an ID, source and date.
    pub fn into_event(self, source: &str, date: DateTime<Utc>) -> Result<Event> {
        self.validate().map_err(|e| {
            Error::invalid_parameter(ValidationErrorCode::InvalidBody, e.to_string())
        })?;

        if !self.value.is_finite() {
            return Err(Error::invalid_parameter(
                ValidationErrorCode::InvalidBody,
                "value must be a finite number",
            ));
        }

        Ok(Event::new(self.metric, self.value, self.category.trim(), date)
            .with_source(source)
            .with_metadata(self.metadata))
    }
}

/// Read filter handed to an [`crate::EventSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct EventFilter {
    pub window: DateWindow,
    pub metric: Option<Metric>,
    pub category: Option<String>,
}

impl EventFilter {
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            metric: None,
            category: None,
        }
    }

    pub fn with_metric(mut self, metric: Option<Metric>) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.window.contains(event.date)
            && self.metric.map_or(true, |m| m == event.metric)
            && self
                .category
                .as_deref()
                .map_or(true, |c| c == event.category)
    }
}
