//! Report service - runs the analytic report suite.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Datelike;
use clap::ValueEnum;

use common::{AppError, AppResult};
use domain::{IndexComparison, Report, ReportParams};

use crate::repository::ReportRepository;

/// Selectable report, or every report in suite order
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    TopSpenders,
    IndexComparison,
    KpiSummary,
    MovingAverage,
    YearOverYear,
    CumulativeRevenue,
    SpendPercentiles,
    OrderGaps,
    All,
}

impl ReportKind {
    /// Every concrete report in the order the suite runs them
    pub const SUITE: [ReportKind; 8] = [
        ReportKind::TopSpenders,
        ReportKind::IndexComparison,
        ReportKind::KpiSummary,
        ReportKind::MovingAverage,
        ReportKind::YearOverYear,
        ReportKind::CumulativeRevenue,
        ReportKind::SpendPercentiles,
        ReportKind::OrderGaps,
    ];

    /// Concrete reports selected by this kind
    pub fn expand(self) -> Vec<ReportKind> {
        match self {
            ReportKind::All => Self::SUITE.to_vec(),
            kind => vec![kind],
        }
    }
}

/// Report service trait for dependency injection.
#[async_trait]
pub trait ReportService: Send + Sync {
    /// Run one report, or all of them for [`ReportKind::All`]
    async fn generate(&self, kind: ReportKind, params: &ReportParams) -> AppResult<Vec<Report>>;

    /// Aggregate the comparison month through both predicate shapes.
    ///
    /// Fails when the two aggregates disagree.
    async fn index_comparison(&self, params: &ReportParams) -> AppResult<IndexComparison>;
}

/// Concrete implementation of ReportService using repository.
pub struct ReportManager {
    repo: Arc<dyn ReportRepository>,
}

impl ReportManager {
    pub fn new(repo: Arc<dyn ReportRepository>) -> Self {
        Self { repo }
    }

    async fn run_one(&self, kind: ReportKind, params: &ReportParams) -> AppResult<Report> {
        let report = match kind {
            ReportKind::TopSpenders => {
                Report::TopSpenders(self.repo.top_spenders_by_city(params.top_per_city).await?)
            }
            ReportKind::IndexComparison => {
                Report::IndexComparison(self.index_comparison(params).await?)
            }
            ReportKind::KpiSummary => Report::KpiSummary(self.repo.sales_kpi_summary().await?),
            ReportKind::MovingAverage => Report::MovingAverage(
                self.repo.moving_average(params.moving_average_days).await?,
            ),
            ReportKind::YearOverYear => Report::YearOverYear(self.repo.year_over_year().await?),
            ReportKind::CumulativeRevenue => Report::CumulativeRevenue(
                self.repo.cumulative_revenue(params.cumulative_since).await?,
            ),
            ReportKind::SpendPercentiles => {
                Report::SpendPercentiles(self.repo.spend_percentiles().await?)
            }
            ReportKind::OrderGaps => Report::OrderGaps(self.repo.order_gaps().await?),
            ReportKind::All => {
                return Err(AppError::internal("'all' must be expanded before running"))
            }
        };

        tracing::info!("Report {} produced {} rows", report.name(), report.row_count());
        Ok(report)
    }
}

#[async_trait]
impl ReportService for ReportManager {
    async fn generate(&self, kind: ReportKind, params: &ReportParams) -> AppResult<Vec<Report>> {
        params.validate()?;

        let mut reports = Vec::new();
        for kind in kind.expand() {
            reports.push(self.run_one(kind, params).await?);
        }

        Ok(reports)
    }

    async fn index_comparison(&self, params: &ReportParams) -> AppResult<IndexComparison> {
        let (start, end) = params.comparison_range()?;
        let (year, month) = (start.year(), start.month());

        let function_predicate = self.repo.month_orders_by_function(year, month).await?;
        let range_predicate = self.repo.month_orders_by_range(start, end).await?;

        if !function_predicate.agrees_with(&range_predicate) {
            tracing::error!(
                "Predicates disagree for {}-{:02}: function {:?}, range {:?}",
                year,
                month,
                function_predicate,
                range_predicate
            );
            return Err(AppError::internal(format!(
                "index comparison diverged for {}-{:02}",
                year, month
            )));
        }

        let function_plan = self.repo.function_predicate_plan(year, month).await?;
        let range_plan = self.repo.range_predicate_plan(start, end).await?;
        tracing::debug!("Function predicate plan: {:?}", function_plan);
        tracing::debug!("Range predicate plan: {:?}", range_plan);

        Ok(IndexComparison {
            month: start.date(),
            function_predicate,
            range_predicate,
            function_plan,
            range_plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::{MovingAverageRow, OrderAggregate};
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    use crate::repository::MockReportRepository;

    fn aggregate(total_orders: i64, revenue_cents: i64) -> OrderAggregate {
        OrderAggregate {
            total_orders,
            total_revenue: Decimal::new(revenue_cents, 2),
        }
    }

    fn plans(repo: &mut MockReportRepository) {
        repo.expect_function_predicate_plan()
            .returning(|_, _| Ok(vec!["SCAN orders".to_string()]));
        repo.expect_range_predicate_plan()
            .returning(|_, _| Ok(vec!["SEARCH orders USING INDEX".to_string()]));
    }

    #[tokio::test]
    async fn test_index_comparison_uses_month_bounds() {
        let mut repo = MockReportRepository::new();
        repo.expect_month_orders_by_function()
            .with(eq(2025), eq(1u32))
            .returning(|_, _| Ok(aggregate(13, 404499)));
        repo.expect_month_orders_by_range()
            .withf(|start, end| {
                start.to_string() == "2025-01-01 00:00:00" && end.to_string() == "2025-02-01 00:00:00"
            })
            .returning(|_, _| Ok(aggregate(13, 404499)));
        plans(&mut repo);

        let service = ReportManager::new(Arc::new(repo));
        let comparison = service.index_comparison(&ReportParams::default()).await.unwrap();

        assert_eq!(comparison.month, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(comparison.function_predicate, comparison.range_predicate);
        assert_eq!(comparison.range_plan.len(), 1);
    }

    #[tokio::test]
    async fn test_index_comparison_fails_on_divergence() {
        let mut repo = MockReportRepository::new();
        repo.expect_month_orders_by_function()
            .returning(|_, _| Ok(aggregate(12, 379499)));
        repo.expect_month_orders_by_range()
            .returning(|_, _| Ok(aggregate(13, 404499)));
        repo.expect_function_predicate_plan().never();

        let service = ReportManager::new(Arc::new(repo));
        let result = service.index_comparison(&ReportParams::default()).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_index_comparison_fails_on_a_one_cent_difference() {
        let mut repo = MockReportRepository::new();
        repo.expect_month_orders_by_function()
            .returning(|_, _| Ok(aggregate(13, 404499)));
        repo.expect_month_orders_by_range()
            .returning(|_, _| Ok(aggregate(13, 404498)));
        repo.expect_range_predicate_plan().never();

        let service = ReportManager::new(Arc::new(repo));
        let result = service.index_comparison(&ReportParams::default()).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_generate_rejects_invalid_params_before_querying() {
        let mut repo = MockReportRepository::new();
        repo.expect_moving_average().never();

        let service = ReportManager::new(Arc::new(repo));
        let params = ReportParams {
            moving_average_days: 0,
            ..ReportParams::default()
        };
        let result = service.generate(ReportKind::MovingAverage, &params).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_generate_passes_window_to_repository() {
        let mut repo = MockReportRepository::new();
        repo.expect_moving_average().with(eq(3u32)).returning(|_| {
            Ok(vec![MovingAverageRow {
                sales_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                daily_revenue: Decimal::new(132499, 2),
                moving_average: Decimal::new(132499, 2),
                window_days: 1,
            }])
        });

        let service = ReportManager::new(Arc::new(repo));
        let params = ReportParams {
            moving_average_days: 3,
            ..ReportParams::default()
        };
        let reports =
            tokio_test::block_on(service.generate(ReportKind::MovingAverage, &params)).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].name(), "moving_average");
    }

    #[tokio::test]
    async fn test_all_runs_every_report_in_order() {
        let mut repo = MockReportRepository::new();
        repo.expect_top_spenders_by_city().returning(|_| Ok(vec![]));
        repo.expect_month_orders_by_function()
            .returning(|_, _| Ok(aggregate(0, 0)));
        repo.expect_month_orders_by_range()
            .returning(|_, _| Ok(aggregate(0, 0)));
        plans(&mut repo);
        repo.expect_sales_kpi_summary().returning(|| Ok(vec![]));
        repo.expect_moving_average().returning(|_| Ok(vec![]));
        repo.expect_year_over_year().returning(|| Ok(vec![]));
        repo.expect_cumulative_revenue().returning(|_| Ok(vec![]));
        repo.expect_spend_percentiles().returning(|| Ok(vec![]));
        repo.expect_order_gaps().returning(|| Ok(vec![]));

        let service = ReportManager::new(Arc::new(repo));
        let reports = service
            .generate(ReportKind::All, &ReportParams::default())
            .await
            .unwrap();

        let names: Vec<_> = reports.iter().map(Report::name).collect();
        assert_eq!(
            names,
            vec![
                "top_spenders",
                "index_comparison",
                "kpi_summary",
                "moving_average",
                "year_over_year",
                "cumulative_revenue",
                "spend_percentiles",
                "order_gaps",
            ]
        );
    }
}
