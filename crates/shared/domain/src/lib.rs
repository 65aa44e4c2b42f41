//! Domain layer - Core storefront entities, report rows and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Report row types are shared between the repository layer (which decodes
//! them) and the presentation layer (which renders them).

pub mod constants;
pub mod error;
pub mod order;
pub mod report;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use order::{NewOrder, OrderStatus};
pub use report::{
    CitySpenderRank, CumulativeRevenueRow, DailyKpi, Diagnostics, IndexComparison,
    LineTotalMismatch, MovingAverageRow, OrderAggregate, OrderGapRow, ProductMatch, Report,
    ReportParams, SpendPercentileRow, TableCounts, YearOverYearRow,
};
pub use user::User;
