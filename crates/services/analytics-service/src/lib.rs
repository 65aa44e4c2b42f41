//! Analytics Service Library
//!
//! Builds and seeds the storefront schema, evolves it for reporting and runs
//! the analytic report suite against it. Every entry point loads its
//! configuration from the environment and opens its own connection.

pub mod config;
pub mod infra;
pub mod render;
pub mod repository;
pub mod service;

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use common::AppResult;
use domain::{Diagnostics, Report, ReportParams, SEARCH_SMOKE_TERM};

use crate::config::AnalyticsServiceConfig;
use crate::infra::Database;
use crate::render::{render_diagnostics, render_reports, OutputFormat};
use crate::repository::{CommerceStore, ReportStore};
use crate::service::{DiagnosticsManager, DiagnosticsService, ReportKind, ReportManager, ReportService};

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Per-invocation report settings layered over the configured defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOverrides {
    pub top_per_city: Option<i64>,
    pub moving_average_days: Option<u32>,
    pub cumulative_since: Option<NaiveDate>,
    pub comparison_month: Option<NaiveDate>,
}

impl ReportOverrides {
    pub fn apply(self, defaults: ReportParams) -> ReportParams {
        ReportParams {
            top_per_city: self.top_per_city.unwrap_or(defaults.top_per_city),
            moving_average_days: self
                .moving_average_days
                .unwrap_or(defaults.moving_average_days),
            cumulative_since: self.cumulative_since.unwrap_or(defaults.cumulative_since),
            comparison_month: self.comparison_month.unwrap_or(defaults.comparison_month),
        }
    }
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> AppResult<()> {
    let config = AnalyticsServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Apply whatever part of the reporting schema shape is missing.
pub async fn run_evolution() -> AppResult<()> {
    let config = AnalyticsServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    evolve(&db).await
}

/// Run one report (or all) and print it.
pub async fn run_reports(
    kind: ReportKind,
    overrides: ReportOverrides,
    format: OutputFormat,
) -> AppResult<()> {
    let config = AnalyticsServiceConfig::from_env();
    let params = overrides.apply(config.report);
    let db = Database::connect(&config.database).await?;

    let reports = generate_reports(&db, kind, &params).await?;
    println!("{}", render_reports(&reports, format)?);

    Ok(())
}

/// Check connectivity and print the post-seed diagnostics.
pub async fn run_verification(format: OutputFormat) -> AppResult<()> {
    let config = AnalyticsServiceConfig::from_env();
    let db = Database::connect(&config.database).await?;

    db.ping().await?;
    let diagnostics = collect_diagnostics(&db).await?;
    println!("{}", render_diagnostics(&diagnostics, format)?);

    Ok(())
}

/// Rebuild the schema from scratch, verify it and run the whole report suite.
pub async fn run_pipeline(format: OutputFormat) -> AppResult<()> {
    let config = AnalyticsServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    db.fresh_migrations().await?;
    info!("Schema rebuilt and seeded");
    evolve(&db).await?;

    let diagnostics = collect_diagnostics(&db).await?;
    println!("{}", render_diagnostics(&diagnostics, format)?);

    let reports = generate_reports(&db, ReportKind::All, &config.report).await?;
    println!("{}", render_reports(&reports, format)?);

    Ok(())
}

async fn evolve(db: &Database) -> AppResult<()> {
    let applied = db.evolve_schema().await?;
    info!("Schema evolution applied {} change(s)", applied.len());
    Ok(())
}

/// Run reports against an open database.
pub async fn generate_reports(
    db: &Database,
    kind: ReportKind,
    params: &ReportParams,
) -> AppResult<Vec<Report>> {
    let repo = Arc::new(ReportStore::new(db.get_connection()));
    let service = ReportManager::new(repo);
    service.generate(kind, params).await
}

/// Collect the diagnostics of an open database.
pub async fn collect_diagnostics(db: &Database) -> AppResult<Diagnostics> {
    let repo = Arc::new(CommerceStore::new(db.get_connection()));
    let service = DiagnosticsManager::new(repo);
    service.run(SEARCH_SMOKE_TERM).await
}
