//! Service layer for business logic.

mod diagnostics_service;
mod report_service;

pub use diagnostics_service::{DiagnosticsManager, DiagnosticsService};
pub use report_service::{ReportKind, ReportManager, ReportService};
