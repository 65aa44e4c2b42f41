//! Domain-level constants.
//!
//! These constants define business rules and report defaults.

// =============================================================================
// Order Status
// =============================================================================

/// Order received, not yet picked
pub const STATUS_PENDING: &str = "pending";

/// Order being picked and packed
pub const STATUS_PROCESSING: &str = "processing";

/// Order handed to the carrier
pub const STATUS_SHIPPED: &str = "shipped";

/// Order delivered and paid; the only status counted as revenue
pub const STATUS_COMPLETED: &str = "completed";

/// All valid status values
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_PROCESSING,
    STATUS_SHIPPED,
    STATUS_COMPLETED,
];

// =============================================================================
// Users
// =============================================================================

/// City assigned to users that have not been placed yet
pub const DEFAULT_CITY: &str = "Unknown";

// =============================================================================
// Reports
// =============================================================================

/// Number of distinct spend ranks kept per city
pub const DEFAULT_TOP_PER_CITY: i64 = 2;

/// Trailing window length of the revenue moving average, in days
pub const DEFAULT_MOVING_AVERAGE_DAYS: u32 = 7;

/// Upper bound for the moving average window
pub const MAX_MOVING_AVERAGE_DAYS: u32 = 366;

/// Number of spend buckets in the percentile report
pub const SPEND_QUARTILES: u32 = 4;

/// First day included in the cumulative revenue report
pub const DEFAULT_CUMULATIVE_SINCE: &str = "2025-01-01";

/// Month compared in the index comparison report (first day of the month)
pub const DEFAULT_COMPARISON_MONTH: &str = "2025-01-01";

/// Term used by the product search smoke test
pub const SEARCH_SMOKE_TERM: &str = "wireless";

/// Date format of the day columns returned by reports
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format used when binding date bounds
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
