//! Report suite tests against the seeded catalog and order history.

mod support;

use analytics_service_lib::generate_reports;
use analytics_service_lib::repository::{ReportRepository, ReportStore};
use analytics_service_lib::service::ReportKind;
use domain::{Report, ReportParams};
use rust_decimal::Decimal;

use support::{add_completed_order, add_user, assert_money, at, day, seeded_database};

fn reports(db: &analytics_service_lib::infra::Database) -> ReportStore {
    ReportStore::new(db.get_connection())
}

#[tokio::test]
async fn test_top_spenders_keep_two_ranks_per_city() {
    let db = seeded_database().await;
    let rows = reports(&db).top_spenders_by_city(2).await.unwrap();

    let ranked: Vec<(&str, &str, i64)> = rows
        .iter()
        .map(|r| (r.city.as_str(), r.username.as_str(), r.spend_rank))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("Chicago", "eve", 1),
            ("Los Angeles", "carol", 1),
            ("Los Angeles", "dave", 2),
            ("New York", "alice", 1),
            ("New York", "bob", 2),
        ]
    );
    assert_money(rows[3].total_spent, 3053.49);
}

#[tokio::test]
async fn test_top_spenders_report_ties_with_shared_rank() {
    let db = seeded_database().await;
    for (name, amount) in [("grace", 500), ("heidi", 500), ("ivan", 300), ("judy", 100)] {
        let id = add_user(&db, name, "Boston").await;
        add_completed_order(&db, id, at(2025, 3, 3, 10), Decimal::from(amount)).await;
    }

    let rows = reports(&db).top_spenders_by_city(2).await.unwrap();
    let boston: Vec<(&str, i64)> = rows
        .iter()
        .filter(|r| r.city == "Boston")
        .map(|r| (r.username.as_str(), r.spend_rank))
        .collect();

    assert_eq!(boston.len(), 3);
    assert!(boston.contains(&("grace", 1)));
    assert!(boston.contains(&("heidi", 1)));
    assert!(boston.contains(&("ivan", 2)));
    assert!(!boston.iter().any(|(name, _)| *name == "judy"));
}

#[tokio::test]
async fn test_index_comparison_predicates_agree() {
    let db = seeded_database().await;
    let result = generate_reports(&db, ReportKind::IndexComparison, &ReportParams::default())
        .await
        .unwrap();

    let comparison = match &result[0] {
        Report::IndexComparison(comparison) => comparison,
        other => panic!("unexpected report {}", other.name()),
    };
    assert_eq!(comparison.month, day(2025, 1, 1));
    assert_eq!(comparison.function_predicate.total_orders, 13);
    assert_money(comparison.function_predicate.total_revenue, 4044.99);
    assert_eq!(comparison.function_predicate, comparison.range_predicate);
    assert!(comparison.function_plan.iter().any(|step| step.contains("SCAN")));
    assert!(comparison
        .range_plan
        .iter()
        .any(|step| step.contains("idx_orders_date_status")));
}

#[tokio::test]
async fn test_month_predicates_match_for_every_seeded_month() {
    let db = seeded_database().await;
    let store = reports(&db);

    for (year, month) in [(2024, 1), (2025, 1), (2025, 2), (2025, 3)] {
        let params = ReportParams {
            comparison_month: day(year, month, 1),
            ..ReportParams::default()
        };
        let (start, end) = params.comparison_range().unwrap();

        let by_function = store.month_orders_by_function(year, month).await.unwrap();
        let by_range = store.month_orders_by_range(start, end).await.unwrap();

        assert_eq!(by_function, by_range, "{}-{}", year, month);
    }
}

#[tokio::test]
async fn test_kpi_view_reflects_new_completed_orders() {
    let db = seeded_database().await;
    let store = reports(&db);
    let before = store.sales_kpi_summary().await.unwrap();
    assert_eq!(before.len(), 25);

    add_completed_order(&db, 1, at(2025, 3, 10, 12), Decimal::from(100)).await;

    let after = store.sales_kpi_summary().await.unwrap();
    let added = after.iter().find(|r| r.sales_date == day(2025, 3, 10)).unwrap();
    assert_eq!(after.len(), 26);
    assert_eq!(added.order_count, 1);
    assert_money(added.total_revenue, 100.0);
    assert_money(added.avg_order_value, 100.0);
}

#[tokio::test]
async fn test_kpi_view_counts_completed_orders_only() {
    let db = seeded_database().await;
    let rows = reports(&db).sales_kpi_summary().await.unwrap();

    assert!(rows.iter().all(|r| r.sales_date != day(2024, 1, 10)));
    let total: i64 = rows.iter().map(|r| r.order_count).sum();
    assert_eq!(total, 25);
}

#[tokio::test]
async fn test_moving_average_first_day_equals_its_revenue() {
    let db = seeded_database().await;
    let rows = reports(&db).moving_average(7).await.unwrap();

    assert_eq!(rows.len(), 25);
    assert_eq!(rows[0].sales_date, day(2024, 1, 5));
    assert_eq!(rows[0].window_days, 1);
    assert_money(rows[0].moving_average, rows[0].daily_revenue);
    assert_money(rows[0].moving_average, 1324.99);
    assert!(rows.windows(2).all(|w| w[0].sales_date < w[1].sales_date));
    assert!(rows.iter().all(|r| r.window_days <= 7));
}

#[tokio::test]
async fn test_moving_average_respects_window() {
    let db = seeded_database().await;
    let rows = reports(&db).moving_average(2).await.unwrap();

    assert_eq!(rows[1].window_days, 2);
    assert_money(rows[1].moving_average, (1324.99 + 89.50) / 2.0);
    assert_eq!(rows[2].window_days, 2);
    assert_money(rows[2].moving_average, (89.50 + 45.00) / 2.0);
}

#[tokio::test]
async fn test_year_over_year_pivots_previous_year() {
    let db = seeded_database().await;
    let rows = reports(&db).year_over_year().await.unwrap();

    assert_eq!(rows.len(), 2);

    let january = &rows[0];
    assert_eq!(january.sales_month, 1);
    assert_eq!(january.current_year, 2025);
    assert_money(january.current_revenue, 3605.50);
    assert_eq!(january.previous_year, Some(2024));
    assert_money(january.previous_revenue.unwrap(), 3143.24);
    assert_money(january.revenue_change.unwrap(), 462.26);

    let february = &rows[1];
    assert_eq!(february.sales_month, 2);
    assert_money(february.current_revenue, 2402.65);
    assert_eq!(february.previous_year, None);
    assert_eq!(february.revenue_change, None);
}

#[tokio::test]
async fn test_cumulative_revenue_runs_from_floor() {
    let db = seeded_database().await;
    let rows = reports(&db).cumulative_revenue(day(2025, 1, 1)).await.unwrap();

    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0].sales_date, day(2025, 1, 2));
    assert_money(rows[0].running_total, 250.0);
    assert_money(rows[19].running_total, 6008.15);

    let mut total = Decimal::ZERO;
    for row in &rows {
        total += row.daily_revenue;
        assert_money(row.running_total, total);
    }
}

#[tokio::test]
async fn test_cumulative_revenue_floor_excludes_earlier_days() {
    let db = seeded_database().await;
    let rows = reports(&db).cumulative_revenue(day(2025, 2, 1)).await.unwrap();

    assert_eq!(rows.len(), 10);
    assert_money(rows[9].running_total, 2402.65);
}

#[tokio::test]
async fn test_spend_percentiles_rank_within_city() {
    let db = seeded_database().await;
    for (name, amount) in [("grace", 500), ("heidi", 400), ("ivan", 300), ("judy", 100)] {
        let id = add_user(&db, name, "Boston").await;
        add_completed_order(&db, id, at(2025, 3, 3, 10), Decimal::from(amount)).await;
    }

    let rows = reports(&db).spend_percentiles().await.unwrap();
    let boston: Vec<_> = rows.iter().filter(|r| r.city == "Boston").collect();

    assert_eq!(boston.len(), 4);
    assert_eq!(boston[0].username, "grace");
    assert_eq!(boston[0].quartile, 4);
    assert_eq!(boston[0].percentile_rank, 1.0);
    assert_eq!(boston[3].username, "judy");
    assert_eq!(boston[3].quartile, 1);
    assert_eq!(boston[3].percentile_rank, 0.0);

    let eve = rows.iter().find(|r| r.username == "eve").unwrap();
    assert_eq!(eve.percentile_rank, 0.0);
}

#[tokio::test]
async fn test_order_gaps_exclude_first_orders() {
    let db = seeded_database().await;
    let rows = reports(&db).order_gaps().await.unwrap();

    assert_eq!(rows.len(), 20);
    assert!(rows.iter().all(|r| r.order_seq > 1));
    assert!(rows.iter().all(|r| r.order_id != 1));

    let alice_second = &rows[0];
    assert_eq!(alice_second.username, "alice");
    assert_eq!(alice_second.order_id, 4);
    assert_eq!(alice_second.order_seq, 2);
    assert_eq!(alice_second.previous_order_date, day(2024, 1, 5));
    assert_eq!(alice_second.days_since_previous, 7);
    assert_money(alice_second.previous_amount, 1324.99);
    assert_money(alice_second.amount_change, 45.00 - 1324.99);
}

#[tokio::test]
async fn test_all_reports_run_in_order() {
    let db = seeded_database().await;
    let result = generate_reports(&db, ReportKind::All, &ReportParams::default())
        .await
        .unwrap();

    assert_eq!(result.len(), ReportKind::SUITE.len());
    assert_eq!(result[0].name(), "top_spenders");
    assert_eq!(result[7].name(), "order_gaps");
}
