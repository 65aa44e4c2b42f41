//! Rendering of reports and diagnostics for the terminal.
//!
//! Text output draws one table per report through `tabled`; JSON output
//! serialises the report values directly.

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use common::AppResult;
use domain::{Diagnostics, IndexComparison, Report};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bordered tables
    #[default]
    Text,
    /// One pretty-printed JSON document
    Json,
}

pub fn render_reports(reports: &[Report], format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => json(reports),
        OutputFormat::Text => Ok(reports
            .iter()
            .map(report_text)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

pub fn render_diagnostics(diagnostics: &Diagnostics, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => json(diagnostics),
        OutputFormat::Text => Ok(diagnostics_text(diagnostics)),
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn table<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return "(no rows)\n".to_string();
    }

    let mut grid = Table::new(rows);
    grid.with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    format!("{}\n", grid)
}

// =============================================================================
// Display rows
// =============================================================================

#[derive(Tabled)]
struct SpenderLine {
    city: String,
    rank: i64,
    user_id: i32,
    username: String,
    total_spent: String,
}

#[derive(Tabled)]
struct AggregateLine {
    predicate: &'static str,
    total_orders: i64,
    total_revenue: String,
}

#[derive(Tabled)]
struct KpiLine {
    sales_date: String,
    order_count: i64,
    total_revenue: String,
    avg_order_value: String,
}

#[derive(Tabled)]
struct MovingAverageLine {
    sales_date: String,
    daily_revenue: String,
    moving_average: String,
    window_days: i64,
}

#[derive(Tabled)]
struct YearOverYearLine {
    month: i64,
    current_year: i64,
    current_revenue: String,
    previous_year: String,
    previous_revenue: String,
    change: String,
}

#[derive(Tabled)]
struct CumulativeLine {
    sales_date: String,
    daily_revenue: String,
    running_total: String,
}

#[derive(Tabled)]
struct PercentileLine {
    city: String,
    user_id: i32,
    username: String,
    total_spent: String,
    percentile: String,
    quartile: i64,
}

#[derive(Tabled)]
struct OrderGapLine {
    user_id: i32,
    username: String,
    seq: i64,
    order_id: i32,
    order_date: String,
    previous_date: String,
    days: i64,
    amount: String,
    previous_amount: String,
    change: String,
}

#[derive(Tabled)]
struct CountLine {
    table: &'static str,
    rows: u64,
}

#[derive(Tabled)]
struct MatchLine {
    id: i32,
    name: String,
}

#[derive(Tabled)]
struct MismatchLine {
    order_id: i32,
    amount: String,
    line_total: String,
}

// =============================================================================
// Text output
// =============================================================================

fn report_text(report: &Report) -> String {
    let body = match report {
        Report::TopSpenders(rows) => table(
            rows.iter()
                .map(|r| SpenderLine {
                    city: r.city.clone(),
                    rank: r.spend_rank,
                    user_id: r.user_id,
                    username: r.username.clone(),
                    total_spent: money(r.total_spent),
                })
                .collect(),
        ),
        Report::IndexComparison(comparison) => comparison_text(comparison),
        Report::KpiSummary(rows) => table(
            rows.iter()
                .map(|r| KpiLine {
                    sales_date: r.sales_date.to_string(),
                    order_count: r.order_count,
                    total_revenue: money(r.total_revenue),
                    avg_order_value: money(r.avg_order_value),
                })
                .collect(),
        ),
        Report::MovingAverage(rows) => table(
            rows.iter()
                .map(|r| MovingAverageLine {
                    sales_date: r.sales_date.to_string(),
                    daily_revenue: money(r.daily_revenue),
                    moving_average: money(r.moving_average),
                    window_days: r.window_days,
                })
                .collect(),
        ),
        Report::YearOverYear(rows) => table(
            rows.iter()
                .map(|r| YearOverYearLine {
                    month: r.sales_month,
                    current_year: r.current_year,
                    current_revenue: money(r.current_revenue),
                    previous_year: optional(r.previous_year),
                    previous_revenue: optional(r.previous_revenue.map(money)),
                    change: optional(r.revenue_change.map(money)),
                })
                .collect(),
        ),
        Report::CumulativeRevenue(rows) => table(
            rows.iter()
                .map(|r| CumulativeLine {
                    sales_date: r.sales_date.to_string(),
                    daily_revenue: money(r.daily_revenue),
                    running_total: money(r.running_total),
                })
                .collect(),
        ),
        Report::SpendPercentiles(rows) => table(
            rows.iter()
                .map(|r| PercentileLine {
                    city: r.city.clone(),
                    user_id: r.user_id,
                    username: r.username.clone(),
                    total_spent: money(r.total_spent),
                    percentile: format!("{:.3}", r.percentile_rank),
                    quartile: r.quartile,
                })
                .collect(),
        ),
        Report::OrderGaps(rows) => table(
            rows.iter()
                .map(|r| OrderGapLine {
                    user_id: r.user_id,
                    username: r.username.clone(),
                    seq: r.order_seq,
                    order_id: r.order_id,
                    order_date: r.order_date.to_string(),
                    previous_date: r.previous_order_date.to_string(),
                    days: r.days_since_previous,
                    amount: money(r.amount),
                    previous_amount: money(r.previous_amount),
                    change: money(r.amount_change),
                })
                .collect(),
        ),
    };

    format!("== {} ==\n{}", report.name(), body)
}

fn comparison_text(comparison: &IndexComparison) -> String {
    let mut out = table(vec![
        AggregateLine {
            predicate: "function",
            total_orders: comparison.function_predicate.total_orders,
            total_revenue: money(comparison.function_predicate.total_revenue),
        },
        AggregateLine {
            predicate: "range",
            total_orders: comparison.range_predicate.total_orders,
            total_revenue: money(comparison.range_predicate.total_revenue),
        },
    ]);

    for (label, plan) in [
        ("function", &comparison.function_plan),
        ("range", &comparison.range_plan),
    ] {
        out.push_str(&format!("{} plan:\n", label));
        for step in plan {
            out.push_str(&format!("  {}\n", step));
        }
    }
    out
}

fn diagnostics_text(diagnostics: &Diagnostics) -> String {
    let counts = &diagnostics.counts;
    let mut out = String::from("== diagnostics ==\n");

    out.push_str(&table(vec![
        CountLine {
            table: "users",
            rows: counts.users,
        },
        CountLine {
            table: "products",
            rows: counts.products,
        },
        CountLine {
            table: "orders",
            rows: counts.orders,
        },
        CountLine {
            table: "order_items",
            rows: counts.order_items,
        },
    ]));
    out.push_str(&format!("orphaned orders: {}\n", diagnostics.orphaned_orders));

    out.push_str(&format!("products matching '{}':\n", diagnostics.search_term));
    out.push_str(&table(
        diagnostics
            .search_matches
            .iter()
            .map(|p| MatchLine {
                id: p.id,
                name: p.name.clone(),
            })
            .collect(),
    ));

    out.push_str("orders whose line totals differ from amount:\n");
    out.push_str(&table(
        diagnostics
            .line_total_mismatches
            .iter()
            .map(|m| MismatchLine {
                order_id: m.order_id,
                amount: money(m.amount),
                line_total: money(m.line_total),
            })
            .collect(),
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CitySpenderRank, LineTotalMismatch, ProductMatch, TableCounts, YearOverYearRow};

    fn spenders() -> Report {
        Report::TopSpenders(vec![CitySpenderRank {
            user_id: 1,
            username: "alice".to_string(),
            city: "New York".to_string(),
            total_spent: Decimal::new(136999, 2),
            spend_rank: 1,
        }])
    }

    #[test]
    fn test_text_report_draws_table_under_title() {
        let out = render_reports(&[spenders()], OutputFormat::Text).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "== top_spenders ==");
        assert!(lines[2].contains("city") && lines[2].contains("total_spent"));
        let alice = lines.iter().find(|l| l.contains("alice")).unwrap();
        assert!(alice.contains("New York"));
        assert!(alice.contains("1369.99"));
    }

    #[test]
    fn test_missing_previous_year_renders_dash() {
        let report = Report::YearOverYear(vec![YearOverYearRow {
            sales_month: 2,
            current_year: 2025,
            current_revenue: Decimal::new(240265, 2),
            previous_year: None,
            previous_revenue: None,
            revenue_change: None,
        }]);
        let out = render_reports(&[report], OutputFormat::Text).unwrap();

        let february = out.lines().find(|l| l.contains("2402.65")).unwrap();
        assert_eq!(february.matches("│ - ").count(), 3);
    }

    #[test]
    fn test_money_keeps_two_decimals() {
        assert_eq!(money(Decimal::new(45, 0)), "45.00");
        assert_eq!(money(Decimal::new(5990, 2)), "59.90");
    }

    #[test]
    fn test_json_tags_each_report() {
        let out = render_reports(&[spenders()], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value[0]["report"], "top_spenders");
        assert_eq!(value[0]["data"][0]["username"], "alice");
    }

    #[test]
    fn test_empty_report_is_marked() {
        let out = render_reports(&[Report::OrderGaps(vec![])], OutputFormat::Text).unwrap();
        assert!(out.contains("(no rows)"));
    }

    #[test]
    fn test_diagnostics_text_lists_matches() {
        let diagnostics = Diagnostics {
            counts: TableCounts {
                users: 5,
                products: 10,
                orders: 8,
                order_items: 16,
            },
            orphaned_orders: 0,
            search_term: "wireless".to_string(),
            search_matches: vec![ProductMatch {
                id: 2,
                name: "Wireless Mouse".to_string(),
            }],
            line_total_mismatches: vec![LineTotalMismatch {
                order_id: 7,
                amount: Decimal::new(5990, 2),
                line_total: Decimal::new(11188, 2),
            }],
        };
        let out = render_diagnostics(&diagnostics, OutputFormat::Text).unwrap();

        assert!(out.contains("orphaned orders: 0"));
        assert!(out.contains("Wireless Mouse"));
        let order_7 = out.lines().find(|l| l.contains("111.88")).unwrap();
        assert!(order_7.contains("59.90"));
    }
}
