//! Analytic report rows and parameters.
//!
//! Money is carried as [`Decimal`]. Sums come back from the database
//! rounded to the cent; averages keep their full precision.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::constants::{
    DAY_FORMAT, DEFAULT_COMPARISON_MONTH, DEFAULT_CUMULATIVE_SINCE, DEFAULT_MOVING_AVERAGE_DAYS,
    DEFAULT_TOP_PER_CITY, MAX_MOVING_AVERAGE_DAYS,
};
use crate::error::{DomainError, DomainResult};

// =============================================================================
// Parameters
// =============================================================================

/// Tunables shared by the report suite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportParams {
    /// Highest dense rank kept per city
    pub top_per_city: i64,
    /// Trailing window of the moving average, current day included
    pub moving_average_days: u32,
    /// Floor of the cumulative revenue report
    pub cumulative_since: NaiveDate,
    /// Any day in the month used by the index comparison
    pub comparison_month: NaiveDate,
}

impl Default for ReportParams {
    fn default() -> Self {
        Self {
            top_per_city: DEFAULT_TOP_PER_CITY,
            moving_average_days: DEFAULT_MOVING_AVERAGE_DAYS,
            cumulative_since: NaiveDate::parse_from_str(DEFAULT_CUMULATIVE_SINCE, DAY_FORMAT)
                .unwrap_or_default(),
            comparison_month: NaiveDate::parse_from_str(DEFAULT_COMPARISON_MONTH, DAY_FORMAT)
                .unwrap_or_default(),
        }
    }
}

impl ReportParams {
    pub fn validate(&self) -> DomainResult<()> {
        if self.top_per_city < 1 {
            return Err(DomainError::validation("top per city must be at least 1"));
        }
        if self.moving_average_days == 0 || self.moving_average_days > MAX_MOVING_AVERAGE_DAYS {
            return Err(DomainError::validation(format!(
                "moving average window must be between 1 and {} days",
                MAX_MOVING_AVERAGE_DAYS
            )));
        }
        Ok(())
    }

    /// Half-open `[start, end)` bounds of the comparison month.
    pub fn comparison_range(&self) -> DomainResult<(NaiveDateTime, NaiveDateTime)> {
        let month = self.comparison_month;
        let start = month
            .with_day(1)
            .ok_or_else(|| DomainError::validation("invalid comparison month"))?;
        let (next_year, next_month) = if month.month() == 12 {
            (month.year() + 1, 1)
        } else {
            (month.year(), month.month() + 1)
        };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .ok_or_else(|| DomainError::validation("comparison month out of range"))?;

        Ok((start.and_time(Default::default()), end.and_time(Default::default())))
    }
}

// =============================================================================
// Report rows
// =============================================================================

/// A user ranked by completed spend inside their city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitySpenderRank {
    pub user_id: i32,
    pub username: String,
    pub city: String,
    pub total_spent: Decimal,
    pub spend_rank: i64,
}

/// Count and sum of orders matched by a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderAggregate {
    pub total_orders: i64,
    pub total_revenue: Decimal,
}

impl OrderAggregate {
    /// Identical order count and identical revenue
    pub fn agrees_with(&self, other: &OrderAggregate) -> bool {
        self.total_orders == other.total_orders && self.total_revenue == other.total_revenue
    }
}

/// One month aggregated through a function-on-column predicate and through
/// an equivalent range predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexComparison {
    pub month: NaiveDate,
    pub function_predicate: OrderAggregate,
    pub range_predicate: OrderAggregate,
    pub function_plan: Vec<String>,
    pub range_plan: Vec<String>,
}

/// Row of `v_sales_kpi_summary`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyKpi {
    pub sales_date: NaiveDate,
    pub order_count: i64,
    pub total_revenue: Decimal,
    pub avg_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverageRow {
    pub sales_date: NaiveDate,
    pub daily_revenue: Decimal,
    pub moving_average: Decimal,
    /// Days that contributed to the average (less than the window at the start)
    pub window_days: i64,
}

/// Calendar month compared against the same month of the previous recorded year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearOverYearRow {
    pub sales_month: i64,
    pub current_year: i64,
    pub current_revenue: Decimal,
    pub previous_year: Option<i64>,
    pub previous_revenue: Option<Decimal>,
    pub revenue_change: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeRevenueRow {
    pub sales_date: NaiveDate,
    pub daily_revenue: Decimal,
    pub running_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendPercentileRow {
    pub user_id: i32,
    pub username: String,
    pub city: String,
    pub total_spent: Decimal,
    pub percentile_rank: f64,
    pub quartile: i64,
}

/// A completed order compared with the same user's previous completed order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderGapRow {
    pub order_id: i32,
    pub user_id: i32,
    pub username: String,
    pub order_seq: i64,
    pub order_date: NaiveDate,
    pub previous_order_date: NaiveDate,
    pub amount: Decimal,
    pub previous_amount: Decimal,
    pub amount_change: Decimal,
    pub days_since_previous: i64,
}

/// Result of one report run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "report", content = "data", rename_all = "snake_case")]
pub enum Report {
    TopSpenders(Vec<CitySpenderRank>),
    IndexComparison(IndexComparison),
    KpiSummary(Vec<DailyKpi>),
    MovingAverage(Vec<MovingAverageRow>),
    YearOverYear(Vec<YearOverYearRow>),
    CumulativeRevenue(Vec<CumulativeRevenueRow>),
    SpendPercentiles(Vec<SpendPercentileRow>),
    OrderGaps(Vec<OrderGapRow>),
}

impl Report {
    pub fn name(&self) -> &'static str {
        match self {
            Report::TopSpenders(_) => "top_spenders",
            Report::IndexComparison(_) => "index_comparison",
            Report::KpiSummary(_) => "kpi_summary",
            Report::MovingAverage(_) => "moving_average",
            Report::YearOverYear(_) => "year_over_year",
            Report::CumulativeRevenue(_) => "cumulative_revenue",
            Report::SpendPercentiles(_) => "spend_percentiles",
            Report::OrderGaps(_) => "order_gaps",
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            Report::TopSpenders(rows) => rows.len(),
            Report::IndexComparison(_) => 2,
            Report::KpiSummary(rows) => rows.len(),
            Report::MovingAverage(rows) => rows.len(),
            Report::YearOverYear(rows) => rows.len(),
            Report::CumulativeRevenue(rows) => rows.len(),
            Report::SpendPercentiles(rows) => rows.len(),
            Report::OrderGaps(rows) => rows.len(),
        }
    }
}

// =============================================================================
// Diagnostics
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub users: u64,
    pub products: u64,
    pub orders: u64,
    pub order_items: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductMatch {
    pub id: i32,
    pub name: String,
}

/// An order whose item line totals differ from its recorded amount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTotalMismatch {
    pub order_id: i32,
    pub amount: Decimal,
    pub line_total: Decimal,
}

/// Read-only sanity checks run after seeding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub counts: TableCounts,
    pub orphaned_orders: u64,
    pub search_term: String,
    pub search_matches: Vec<ProductMatch>,
    pub line_total_mismatches: Vec<LineTotalMismatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_params_are_valid() {
        let params = ReportParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.cumulative_since, date(2025, 1, 1));
        assert_eq!(params.comparison_month, date(2025, 1, 1));
    }

    #[test]
    fn test_params_reject_empty_window_and_rank() {
        let params = ReportParams {
            top_per_city: 0,
            ..ReportParams::default()
        };
        assert!(params.validate().is_err());

        let params = ReportParams {
            moving_average_days: 0,
            ..ReportParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_comparison_range_is_half_open_month() {
        let params = ReportParams {
            comparison_month: date(2025, 1, 17),
            ..ReportParams::default()
        };
        let (start, end) = params.comparison_range().unwrap();
        assert_eq!(start, date(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(end, date(2025, 2, 1).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_comparison_range_wraps_december() {
        let params = ReportParams {
            comparison_month: date(2024, 12, 5),
            ..ReportParams::default()
        };
        let (_, end) = params.comparison_range().unwrap();
        assert_eq!(end, date(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_aggregates_agree_only_when_identical() {
        let a = OrderAggregate {
            total_orders: 13,
            total_revenue: Decimal::new(404499, 2),
        };
        let same_value_other_scale = OrderAggregate {
            total_orders: 13,
            total_revenue: Decimal::new(4044990, 3),
        };
        let off_by_a_cent = OrderAggregate {
            total_orders: 13,
            total_revenue: Decimal::new(404498, 2),
        };
        let fewer_orders = OrderAggregate {
            total_orders: 12,
            total_revenue: Decimal::new(404499, 2),
        };

        assert!(a.agrees_with(&same_value_other_scale));
        assert!(!a.agrees_with(&off_by_a_cent));
        assert!(!a.agrees_with(&fewer_orders));
    }
}
