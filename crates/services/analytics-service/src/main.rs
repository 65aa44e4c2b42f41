//! Analytics Service - schema setup and reporting CLI for the storefront database.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analytics_service_lib::render::OutputFormat;
use analytics_service_lib::service::ReportKind;
use analytics_service_lib::{MigrateAction, ReportOverrides};

#[derive(Parser)]
#[command(name = "analytics-service")]
#[command(about = "Storefront schema management and sales analytics")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format for reports and diagnostics
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Bring the schema to its reporting shape
    Evolve,
    /// Run an analytic report
    Report {
        #[arg(value_enum)]
        kind: ReportKind,
        /// Highest rank kept per city
        #[arg(long)]
        top: Option<i64>,
        /// Moving average window in days
        #[arg(long)]
        window: Option<u32>,
        /// First day of the cumulative revenue report (YYYY-MM-DD)
        #[arg(long)]
        since: Option<NaiveDate>,
        /// Any day of the month used by the index comparison (YYYY-MM-DD)
        #[arg(long)]
        month: Option<NaiveDate>,
    },
    /// Print row counts and data sanity checks
    Verify,
    /// Reset the database and run every step end to end
    Run,
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            analytics_service_lib::run_migrations(migrate_action).await
        }
        Commands::Evolve => analytics_service_lib::run_evolution().await,
        Commands::Report {
            kind,
            top,
            window,
            since,
            month,
        } => {
            let overrides = ReportOverrides {
                top_per_city: top,
                moving_average_days: window,
                cumulative_since: since,
                comparison_month: month,
            };
            analytics_service_lib::run_reports(kind, overrides, cli.format).await
        }
        Commands::Verify => analytics_service_lib::run_verification(cli.format).await,
        Commands::Run => analytics_service_lib::run_pipeline(cli.format).await,
    };

    if let Err(err) = result {
        tracing::error!(code = err.code(), "{}", err.user_message());
        std::process::exit(1);
    }
}
