//! Defaults and bounds for dashboard queries and event bodies.

// === Windows ===

/// Look-back used when `days` is missing or invalid.
pub const DEFAULT_DAYS_BACK: u32 = 30;

/// Largest look-back accepted by the strict parameter path (~3 years).
pub const MAX_DAYS_BACK: u32 = 1095;

/// Length of the overview KPI window and of its growth comparison window.
pub const OVERVIEW_WINDOW_DAYS: u32 = 30;

/// Realtime feed look-back in minutes.
pub const REALTIME_WINDOW_MINUTES: i64 = 5;

/// Maximum events returned by a realtime snapshot.
pub const REALTIME_EVENT_LIMIT: usize = 50;

// === Listing ===

/// Default page size for event listings.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Maximum page size for event listings.
pub const MAX_PAGE_SIZE: u32 = 500;

// === Event fields ===

/// Category max length (chars).
pub const MAX_CATEGORY_LEN: usize = 100;

/// Maximum serialized metadata size in bytes (16KB).
pub const MAX_METADATA_BYTES: usize = 16 * 1024;

// === Auth ===

/// Session token format: `dsh_` followed by 32-128 URL-safe characters.
pub const SESSION_TOKEN_PATTERN: &str = r"^dsh_[A-Za-z0-9_-]{32,128}$";
