//! Event store abstractions.
//!
//! The aggregator only needs [`EventSource`]; the API's CRUD endpoints use the
//! wider [`EventStore`]. Implementations translate their own failures into
//! [`crate::Error::DataSourceUnavailable`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::error::Result;
use crate::events::{Event, EventFilter};
use crate::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::metric::Metric;

/// Read access to raw events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Returns every event matching the filter. No pagination.
    async fn fetch_events(&self, filter: &EventFilter) -> Result<Vec<Event>>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Read-write access used by the event management endpoints.
#[async_trait]
pub trait EventStore: EventSource {
    async fn insert(&self, event: Event) -> Result<()>;

    async fn list(&self, query: &ListQuery) -> Result<Page<Event>>;

    /// Removes an event, returning it if it existed.
    async fn delete(&self, id: Uuid) -> Result<Option<Event>>;
}

/// Sort key for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Value,
    Metric,
    Category,
}

impl SortField {
    /// Unknown names fall back to `date`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "value" => Self::Value,
            "metric" => Self::Metric,
            "category" => Self::Category,
            _ => Self::Date,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Value => "value",
            Self::Metric => "metric",
            Self::Category => "category",
        }
    }

    fn compare(&self, a: &Event, b: &Event) -> Ordering {
        match self {
            Self::Date => a.date.cmp(&b.date),
            Self::Value => a.value.total_cmp(&b.value),
            Self::Metric => a.metric.cmp(&b.metric),
            Self::Category => a.category.cmp(&b.category),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Anything other than `asc` sorts descending.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Filtered, sorted, paged listing request. `start` and `end` are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub metric: Option<Metric>,
    pub category: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            metric: None,
            category: None,
            start: None,
            end: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl ListQuery {
    /// Clamps `page` and `limit` into their valid ranges.
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.metric.map_or(true, |m| m == event.metric)
            && self
                .category
                .as_deref()
                .map_or(true, |c| c == event.category)
            && self.start.map_or(true, |s| event.date >= s)
            && self.end.map_or(true, |e| event.date <= e)
    }

    /// Ordering for in-memory listings.
    pub fn compare(&self, a: &Event, b: &Event) -> Ordering {
        let ord = self.sort_by.compare(a, b);
        match self.sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit))
    }
}
