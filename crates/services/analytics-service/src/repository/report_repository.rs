//! Report repository.
//!
//! Every report is a single read-only statement. Values are normalised in
//! SQL through [`Dialect`] so decoding is identical on every backend.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{ConnectionTrait, DatabaseConnection, Value};

use common::{AppError, AppResult};
use domain::{
    CitySpenderRank, CumulativeRevenueRow, DailyKpi, MovingAverageRow, OrderAggregate,
    OrderGapRow, SpendPercentileRow, YearOverYearRow, DEFAULT_CITY, SPEND_QUARTILES,
    STATUS_COMPLETED, TIMESTAMP_FORMAT,
};

use super::rows::{get, get_day, statement};
use crate::infra::migrations::SALES_KPI_VIEW;
use crate::infra::Dialect;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Report repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Users ranked by completed spend within their city, dense rank <= `max_rank`
    async fn top_spenders_by_city(&self, max_rank: i64) -> AppResult<Vec<CitySpenderRank>>;

    /// Orders of one month selected by extracting year and month from the date
    async fn month_orders_by_function(&self, year: i32, month: u32) -> AppResult<OrderAggregate>;

    /// Orders selected by a half-open `[start, end)` range on the raw date
    async fn month_orders_by_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AppResult<OrderAggregate>;

    async fn function_predicate_plan(&self, year: i32, month: u32) -> AppResult<Vec<String>>;

    async fn range_predicate_plan(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AppResult<Vec<String>>;

    /// Contents of the daily KPI view
    async fn sales_kpi_summary(&self) -> AppResult<Vec<DailyKpi>>;

    async fn moving_average(&self, window_days: u32) -> AppResult<Vec<MovingAverageRow>>;

    async fn year_over_year(&self) -> AppResult<Vec<YearOverYearRow>>;

    async fn cumulative_revenue(&self, since: NaiveDate) -> AppResult<Vec<CumulativeRevenueRow>>;

    async fn spend_percentiles(&self) -> AppResult<Vec<SpendPercentileRow>>;

    /// Completed orders after each user's first, with the gap to the previous one
    async fn order_gaps(&self) -> AppResult<Vec<OrderGapRow>>;
}

/// Concrete implementation of ReportRepository
pub struct ReportStore {
    db: DatabaseConnection,
    dialect: Dialect,
}

impl ReportStore {
    pub fn new(db: DatabaseConnection) -> Self {
        let dialect = Dialect::new(db.get_database_backend());
        Self { db, dialect }
    }

    /// Completed spend per user, city defaulted
    fn user_spend_cte(&self) -> String {
        format!(
            "user_spend AS ( \
                SELECT u.id AS user_id, u.username AS username, \
                       COALESCE(u.city, '{city}') AS city, SUM(o.amount) AS spent \
                FROM users u JOIN orders o ON o.user_id = u.id \
                WHERE o.status = '{status}' \
                GROUP BY u.id, u.username, u.city \
             )",
            city = DEFAULT_CITY,
            status = STATUS_COMPLETED,
        )
    }

    /// Completed revenue per calendar day
    fn daily_revenue_cte(&self, filter: &str) -> String {
        let day = self.dialect.day("order_date");
        format!(
            "daily AS ( \
                SELECT {day} AS sales_date, SUM(amount) AS daily_revenue \
                FROM orders \
                WHERE status = '{status}'{filter} \
                GROUP BY {day} \
             )",
            day = day,
            status = STATUS_COMPLETED,
            filter = filter,
        )
    }

    fn month_aggregate_select(&self) -> String {
        format!(
            "SELECT {} AS total_orders, {} AS total_revenue FROM orders",
            self.dialect.integer("COUNT(*)"),
            self.dialect.money("COALESCE(SUM(amount), 0)"),
        )
    }

    fn function_predicate(&self, year: i32, month: u32) -> (String, Vec<Value>) {
        let d = &self.dialect;
        let sql = format!(
            "{} WHERE {} = {} AND {} = {}",
            self.month_aggregate_select(),
            d.year("order_date"),
            d.param(1),
            d.month("order_date"),
            d.param(2),
        );
        (sql, vec![i64::from(year).into(), i64::from(month).into()])
    }

    fn range_predicate(&self, start: NaiveDateTime, end: NaiveDateTime) -> (String, Vec<Value>) {
        let d = &self.dialect;
        let sql = format!(
            "{} WHERE order_date >= {} AND order_date < {}",
            self.month_aggregate_select(),
            d.timestamp_param(1),
            d.timestamp_param(2),
        );
        (
            sql,
            vec![
                start.format(TIMESTAMP_FORMAT).to_string().into(),
                end.format(TIMESTAMP_FORMAT).to_string().into(),
            ],
        )
    }

    async fn aggregate(&self, sql: String, values: Vec<Value>) -> AppResult<OrderAggregate> {
        let row = self
            .db
            .query_one(statement(&self.dialect, sql, values))
            .await?
            .ok_or_else(|| AppError::internal("aggregate returned no row"))?;

        Ok(OrderAggregate {
            total_orders: get(&row, "total_orders")?,
            total_revenue: get(&row, "total_revenue")?,
        })
    }

    async fn explain(&self, sql: String, values: Vec<Value>) -> AppResult<Vec<String>> {
        let d = &self.dialect;
        let rows = self
            .db
            .query_all(statement(d, format!("{} {}", d.explain(), sql), values))
            .await?;

        rows.iter().map(|row| get(row, d.plan_column())).collect()
    }
}

#[async_trait]
impl ReportRepository for ReportStore {
    async fn top_spenders_by_city(&self, max_rank: i64) -> AppResult<Vec<CitySpenderRank>> {
        let d = &self.dialect;
        let sql = format!(
            "WITH {user_spend}, \
             ranked AS ( \
                SELECT user_id, username, city, spent, \
                       DENSE_RANK() OVER (PARTITION BY city ORDER BY spent DESC) AS spend_rank \
                FROM user_spend \
             ) \
             SELECT user_id, username, city, {spent} AS total_spent, {rank} AS spend_rank \
             FROM ranked \
             WHERE spend_rank <= {limit} \
             ORDER BY city, spend_rank, user_id",
            user_spend = self.user_spend_cte(),
            spent = d.money("spent"),
            rank = d.integer("spend_rank"),
            limit = d.param(1),
        );

        let rows = self
            .db
            .query_all(statement(d, sql, vec![max_rank.into()]))
            .await?;

        rows.iter()
            .map(|row| {
                Ok(CitySpenderRank {
                    user_id: get(row, "user_id")?,
                    username: get(row, "username")?,
                    city: get(row, "city")?,
                    total_spent: get(row, "total_spent")?,
                    spend_rank: get(row, "spend_rank")?,
                })
            })
            .collect()
    }

    async fn month_orders_by_function(&self, year: i32, month: u32) -> AppResult<OrderAggregate> {
        let (sql, values) = self.function_predicate(year, month);
        self.aggregate(sql, values).await
    }

    async fn month_orders_by_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AppResult<OrderAggregate> {
        let (sql, values) = self.range_predicate(start, end);
        self.aggregate(sql, values).await
    }

    async fn function_predicate_plan(&self, year: i32, month: u32) -> AppResult<Vec<String>> {
        let (sql, values) = self.function_predicate(year, month);
        self.explain(sql, values).await
    }

    async fn range_predicate_plan(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AppResult<Vec<String>> {
        let (sql, values) = self.range_predicate(start, end);
        self.explain(sql, values).await
    }

    async fn sales_kpi_summary(&self) -> AppResult<Vec<DailyKpi>> {
        let d = &self.dialect;
        let sql = format!(
            "SELECT sales_date, {count} AS order_count, {revenue} AS total_revenue, \
                    {avg} AS avg_order_value \
             FROM {view} \
             ORDER BY sales_date",
            count = d.integer("order_count"),
            revenue = d.money("total_revenue"),
            avg = d.average("avg_order_value"),
            view = SALES_KPI_VIEW,
        );

        let rows = self.db.query_all(statement(d, sql, vec![])).await?;

        rows.iter()
            .map(|row| {
                Ok(DailyKpi {
                    sales_date: get_day(row, "sales_date")?,
                    order_count: get(row, "order_count")?,
                    total_revenue: get(row, "total_revenue")?,
                    avg_order_value: get(row, "avg_order_value")?,
                })
            })
            .collect()
    }

    async fn moving_average(&self, window_days: u32) -> AppResult<Vec<MovingAverageRow>> {
        let d = &self.dialect;
        let frame = format!(
            "OVER (ORDER BY sales_date ROWS BETWEEN {} PRECEDING AND CURRENT ROW)",
            window_days.saturating_sub(1)
        );
        let sql = format!(
            "WITH {daily} \
             SELECT sales_date, {revenue} AS daily_revenue, \
                    {average} AS moving_average, {count} AS window_days \
             FROM daily \
             ORDER BY sales_date",
            daily = self.daily_revenue_cte(""),
            revenue = d.money("daily_revenue"),
            average = d.average(&format!("AVG(daily_revenue) {}", frame)),
            count = d.integer(&format!("COUNT(*) {}", frame)),
        );

        let rows = self.db.query_all(statement(d, sql, vec![])).await?;

        rows.iter()
            .map(|row| {
                Ok(MovingAverageRow {
                    sales_date: get_day(row, "sales_date")?,
                    daily_revenue: get(row, "daily_revenue")?,
                    moving_average: get(row, "moving_average")?,
                    window_days: get(row, "window_days")?,
                })
            })
            .collect()
    }

    async fn year_over_year(&self) -> AppResult<Vec<YearOverYearRow>> {
        let d = &self.dialect;
        let year = d.year("order_date");
        let month = d.month("order_date");
        let sql = format!(
            "WITH monthly AS ( \
                SELECT {year} AS sales_year, {month} AS sales_month, SUM(amount) AS revenue \
                FROM orders \
                WHERE status = '{status}' \
                GROUP BY {year}, {month} \
             ), \
             ranked AS ( \
                SELECT sales_year, sales_month, revenue, \
                       RANK() OVER (PARTITION BY sales_month ORDER BY sales_year DESC) AS year_rank \
                FROM monthly \
             ), \
             pivoted AS ( \
                SELECT sales_month, \
                       MAX(CASE WHEN year_rank = 1 THEN sales_year END) AS current_year, \
                       MAX(CASE WHEN year_rank = 1 THEN revenue END) AS current_revenue, \
                       MAX(CASE WHEN year_rank = 2 THEN sales_year END) AS previous_year, \
                       MAX(CASE WHEN year_rank = 2 THEN revenue END) AS previous_revenue \
                FROM ranked \
                GROUP BY sales_month \
             ) \
             SELECT {out_month} AS sales_month, {current_year} AS current_year, \
                    {current_revenue} AS current_revenue, {previous_year} AS previous_year, \
                    {previous_revenue} AS previous_revenue, {change} AS revenue_change \
             FROM pivoted \
             ORDER BY sales_month",
            year = year,
            month = month,
            status = STATUS_COMPLETED,
            out_month = d.integer("sales_month"),
            current_year = d.integer("current_year"),
            current_revenue = d.money("current_revenue"),
            previous_year = d.integer("previous_year"),
            previous_revenue = d.money("previous_revenue"),
            change = d.money("current_revenue - previous_revenue"),
        );

        let rows = self.db.query_all(statement(d, sql, vec![])).await?;

        rows.iter()
            .map(|row| {
                Ok(YearOverYearRow {
                    sales_month: get(row, "sales_month")?,
                    current_year: get(row, "current_year")?,
                    current_revenue: get(row, "current_revenue")?,
                    previous_year: get(row, "previous_year")?,
                    previous_revenue: get(row, "previous_revenue")?,
                    revenue_change: get(row, "revenue_change")?,
                })
            })
            .collect()
    }

    async fn cumulative_revenue(&self, since: NaiveDate) -> AppResult<Vec<CumulativeRevenueRow>> {
        let d = &self.dialect;
        let filter = format!(" AND order_date >= {}", d.timestamp_param(1));
        let sql = format!(
            "WITH {daily} \
             SELECT sales_date, {revenue} AS daily_revenue, {running} AS running_total \
             FROM daily \
             ORDER BY sales_date",
            daily = self.daily_revenue_cte(&filter),
            revenue = d.money("daily_revenue"),
            running = d.money(
                "SUM(daily_revenue) OVER (ORDER BY sales_date \
                 ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)"
            ),
        );
        let floor = since.and_time(Default::default()).format(TIMESTAMP_FORMAT).to_string();

        let rows = self.db.query_all(statement(d, sql, vec![floor.into()])).await?;

        rows.iter()
            .map(|row| {
                Ok(CumulativeRevenueRow {
                    sales_date: get_day(row, "sales_date")?,
                    daily_revenue: get(row, "daily_revenue")?,
                    running_total: get(row, "running_total")?,
                })
            })
            .collect()
    }

    async fn spend_percentiles(&self) -> AppResult<Vec<SpendPercentileRow>> {
        let d = &self.dialect;
        let sql = format!(
            "WITH {user_spend} \
             SELECT user_id, username, city, {spent} AS total_spent, \
                    {percent} AS percentile_rank, {quartile} AS quartile \
             FROM user_spend \
             ORDER BY city, spent DESC, user_id",
            user_spend = self.user_spend_cte(),
            spent = d.money("spent"),
            percent = d.real("PERCENT_RANK() OVER (PARTITION BY city ORDER BY spent)"),
            quartile = d.integer(&format!(
                "NTILE({}) OVER (PARTITION BY city ORDER BY spent)",
                SPEND_QUARTILES
            )),
        );

        let rows = self.db.query_all(statement(d, sql, vec![])).await?;

        rows.iter()
            .map(|row| {
                Ok(SpendPercentileRow {
                    user_id: get(row, "user_id")?,
                    username: get(row, "username")?,
                    city: get(row, "city")?,
                    total_spent: get(row, "total_spent")?,
                    percentile_rank: get(row, "percentile_rank")?,
                    quartile: get(row, "quartile")?,
                })
            })
            .collect()
    }

    async fn order_gaps(&self) -> AppResult<Vec<OrderGapRow>> {
        let d = &self.dialect;
        let sql = format!(
            "WITH sequenced AS ( \
                SELECT o.id AS order_id, o.user_id AS user_id, u.username AS username, \
                       o.order_date AS placed_at, o.amount AS amount, \
                       ROW_NUMBER() OVER (PARTITION BY o.user_id ORDER BY o.order_date, o.id) AS seq, \
                       LAG(o.order_date) OVER (PARTITION BY o.user_id ORDER BY o.order_date, o.id) AS previous_placed_at, \
                       LAG(o.amount) OVER (PARTITION BY o.user_id ORDER BY o.order_date, o.id) AS previous_amount \
                FROM orders o JOIN users u ON u.id = o.user_id \
                WHERE o.status = '{status}' \
             ) \
             SELECT order_id, user_id, username, {seq} AS order_seq, \
                    {day} AS order_date, {previous_day} AS previous_order_date, \
                    {amount} AS amount, {previous_amount} AS previous_amount, \
                    {change} AS amount_change, {gap} AS days_since_previous \
             FROM sequenced \
             WHERE seq > 1 \
             ORDER BY user_id, seq",
            status = STATUS_COMPLETED,
            seq = d.integer("seq"),
            day = d.day("placed_at"),
            previous_day = d.day("previous_placed_at"),
            amount = d.money("amount"),
            previous_amount = d.money("previous_amount"),
            change = d.money("amount - previous_amount"),
            gap = d.days_between("placed_at", "previous_placed_at"),
        );

        let rows = self.db.query_all(statement(d, sql, vec![])).await?;

        rows.iter()
            .map(|row| {
                Ok(OrderGapRow {
                    order_id: get(row, "order_id")?,
                    user_id: get(row, "user_id")?,
                    username: get(row, "username")?,
                    order_seq: get(row, "order_seq")?,
                    order_date: get_day(row, "order_date")?,
                    previous_order_date: get_day(row, "previous_order_date")?,
                    amount: get(row, "amount")?,
                    previous_amount: get(row, "previous_amount")?,
                    amount_change: get(row, "amount_change")?,
                    days_since_previous: get(row, "days_since_previous")?,
                })
            })
            .collect()
    }
}
