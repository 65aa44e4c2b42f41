//! Analytics service configuration.

use std::env;

use chrono::NaiveDate;
use common::DatabaseConfig;
use domain::{ReportParams, DAY_FORMAT};

/// Analytics service configuration.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsServiceConfig {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Report defaults, overridable per command
    pub report: ReportParams,
}

impl AnalyticsServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to the defaults with a warning.
    pub fn from_env() -> Self {
        let database_defaults = DatabaseConfig::default();
        let report_defaults = ReportParams::default();

        let database = DatabaseConfig {
            url: env::var("ANALYTICS_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or(database_defaults.url),
            max_connections: parse_var("ANALYTICS_DB_MAX_CONNECTIONS")
                .unwrap_or(database_defaults.max_connections),
            min_connections: parse_var("ANALYTICS_DB_MIN_CONNECTIONS")
                .unwrap_or(database_defaults.min_connections),
        };

        let report = ReportParams {
            top_per_city: parse_var("ANALYTICS_TOP_PER_CITY")
                .unwrap_or(report_defaults.top_per_city),
            moving_average_days: parse_var("ANALYTICS_MOVING_AVERAGE_DAYS")
                .unwrap_or(report_defaults.moving_average_days),
            cumulative_since: date_var("ANALYTICS_CUMULATIVE_SINCE")
                .unwrap_or(report_defaults.cumulative_since),
            comparison_month: date_var("ANALYTICS_COMPARISON_MONTH")
                .unwrap_or(report_defaults.comparison_month),
        };

        Self { database, report }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {}", name, raw);
            None
        }
    }
}

fn date_var(name: &str) -> Option<NaiveDate> {
    let raw = env::var(name).ok()?;
    match NaiveDate::parse_from_str(&raw, DAY_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::warn!("Ignoring invalid date for {}: {}", name, raw);
            None
        }
    }
}
