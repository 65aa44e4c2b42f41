//! Backend-specific SQL fragments.
//!
//! Report statements are plain SQL built from these fragments so the same
//! query text runs on PostgreSQL and SQLite. Every fragment that produces a
//! value normalises its type: days come back as `YYYY-MM-DD` text, integral
//! values as BIGINT, money as a decimal rounded to the cent and ratios as
//! double precision.

use sea_orm::DatabaseBackend;

/// SQL flavour of the connected database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    backend: DatabaseBackend,
}

impl Dialect {
    pub fn new(backend: DatabaseBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    fn is_postgres(&self) -> bool {
        matches!(self.backend, DatabaseBackend::Postgres)
    }

    /// Positional bind placeholder (1-based)
    pub fn param(&self, index: usize) -> String {
        if self.is_postgres() {
            format!("${}", index)
        } else {
            "?".to_string()
        }
    }

    /// Placeholder for a timestamp bound as `YYYY-MM-DD HH:MM:SS` text
    pub fn timestamp_param(&self, index: usize) -> String {
        if self.is_postgres() {
            format!("CAST(${} AS TIMESTAMP)", index)
        } else {
            "?".to_string()
        }
    }

    /// Calendar day of a timestamp as `YYYY-MM-DD` text
    pub fn day(&self, column: &str) -> String {
        if self.is_postgres() {
            format!("TO_CHAR({}, 'YYYY-MM-DD')", column)
        } else {
            format!("STRFTIME('%Y-%m-%d', {})", column)
        }
    }

    pub fn year(&self, column: &str) -> String {
        if self.is_postgres() {
            format!("CAST(EXTRACT(YEAR FROM {}) AS BIGINT)", column)
        } else {
            format!("CAST(STRFTIME('%Y', {}) AS BIGINT)", column)
        }
    }

    pub fn month(&self, column: &str) -> String {
        if self.is_postgres() {
            format!("CAST(EXTRACT(MONTH FROM {}) AS BIGINT)", column)
        } else {
            format!("CAST(STRFTIME('%m', {}) AS BIGINT)", column)
        }
    }

    /// Whole calendar days from `earlier` to `later`
    pub fn days_between(&self, later: &str, earlier: &str) -> String {
        if self.is_postgres() {
            format!(
                "CAST(CAST({} AS DATE) - CAST({} AS DATE) AS BIGINT)",
                later, earlier
            )
        } else {
            format!(
                "CAST(JULIANDAY(DATE({})) - JULIANDAY(DATE({})) AS BIGINT)",
                later, earlier
            )
        }
    }

    /// Money rounded to the cent.
    ///
    /// SQLite has no decimal storage class, so the rounded value travels as
    /// REAL and is converted back to a decimal when decoded.
    pub fn money(&self, expr: &str) -> String {
        if self.is_postgres() {
            format!("ROUND(CAST({} AS NUMERIC), 2)", expr)
        } else {
            format!("ROUND({}, 2)", expr)
        }
    }

    /// Average of money, unrounded
    pub fn average(&self, expr: &str) -> String {
        if self.is_postgres() {
            format!("CAST({} AS NUMERIC)", expr)
        } else {
            format!("CAST({} AS REAL)", expr)
        }
    }

    /// Ratio as a double
    pub fn real(&self, expr: &str) -> String {
        if self.is_postgres() {
            format!("CAST({} AS DOUBLE PRECISION)", expr)
        } else {
            format!("CAST({} AS REAL)", expr)
        }
    }

    pub fn integer(&self, expr: &str) -> String {
        format!("CAST({} AS BIGINT)", expr)
    }

    /// Predicate matching `term` inside a free-text column.
    ///
    /// PostgreSQL uses the full-text index; SQLite falls back to a
    /// case-insensitive substring match, so the bound value must be wrapped
    /// with [`Dialect::search_value`].
    pub fn text_search(&self, column: &str, index: usize) -> String {
        if self.is_postgres() {
            format!(
                "to_tsvector('english', {}) @@ plainto_tsquery('english', ${})",
                column, index
            )
        } else {
            format!("{} LIKE ?", column)
        }
    }

    pub fn search_value(&self, term: &str) -> String {
        if self.is_postgres() {
            term.to_string()
        } else {
            format!("%{}%", term)
        }
    }

    /// Statement prefix returning the execution plan of a query
    pub fn explain(&self) -> &'static str {
        if self.is_postgres() {
            "EXPLAIN"
        } else {
            "EXPLAIN QUERY PLAN"
        }
    }

    /// Column of the plan rows holding the readable step
    pub fn plan_column(&self) -> &'static str {
        if self.is_postgres() {
            "QUERY PLAN"
        } else {
            "detail"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_follow_backend() {
        let pg = Dialect::new(DatabaseBackend::Postgres);
        let lite = Dialect::new(DatabaseBackend::Sqlite);

        assert_eq!(pg.param(2), "$2");
        assert_eq!(lite.param(2), "?");
        assert_eq!(pg.timestamp_param(1), "CAST($1 AS TIMESTAMP)");
        assert_eq!(lite.timestamp_param(1), "?");
    }

    #[test]
    fn test_day_is_text_on_both_backends() {
        let pg = Dialect::new(DatabaseBackend::Postgres);
        let lite = Dialect::new(DatabaseBackend::Sqlite);

        assert_eq!(pg.day("o.order_date"), "TO_CHAR(o.order_date, 'YYYY-MM-DD')");
        assert_eq!(lite.day("o.order_date"), "STRFTIME('%Y-%m-%d', o.order_date)");
    }

    #[test]
    fn test_real_avoids_single_precision_on_postgres() {
        let pg = Dialect::new(DatabaseBackend::Postgres);
        assert_eq!(pg.real("PERCENT_RANK()"), "CAST(PERCENT_RANK() AS DOUBLE PRECISION)");
    }

    #[test]
    fn test_money_is_rounded_to_the_cent() {
        let pg = Dialect::new(DatabaseBackend::Postgres);
        let lite = Dialect::new(DatabaseBackend::Sqlite);

        assert_eq!(pg.money("SUM(amount)"), "ROUND(CAST(SUM(amount) AS NUMERIC), 2)");
        assert_eq!(lite.money("SUM(amount)"), "ROUND(SUM(amount), 2)");
        assert_eq!(lite.average("AVG(amount)"), "CAST(AVG(amount) AS REAL)");
    }

    #[test]
    fn test_sqlite_search_wraps_term() {
        let lite = Dialect::new(DatabaseBackend::Sqlite);
        assert_eq!(lite.search_value("wireless"), "%wireless%");
        assert_eq!(lite.text_search("p.description", 1), "p.description LIKE ?");
    }
}
