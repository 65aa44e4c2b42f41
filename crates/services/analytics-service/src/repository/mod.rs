//! Repository layer for data access.

mod commerce_repository;
pub mod entities;
mod report_repository;
mod rows;

pub use commerce_repository::{CommerceRepository, CommerceStore};
pub use report_repository::{ReportRepository, ReportStore};

#[cfg(any(test, feature = "test-utils"))]
pub use commerce_repository::MockCommerceRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use report_repository::MockReportRepository;
