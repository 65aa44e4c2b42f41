//! Order domain types.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{STATUS_COMPLETED, STATUS_PENDING, STATUS_PROCESSING, STATUS_SHIPPED};
use crate::error::{DomainError, DomainResult};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => STATUS_PENDING,
            OrderStatus::Processing => STATUS_PROCESSING,
            OrderStatus::Shipped => STATUS_SHIPPED,
            OrderStatus::Completed => STATUS_COMPLETED,
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(OrderStatus::Pending),
            STATUS_PROCESSING => Ok(OrderStatus::Processing),
            STATUS_SHIPPED => Ok(OrderStatus::Shipped),
            STATUS_COMPLETED => Ok(OrderStatus::Completed),
            other => Err(DomainError::validation(format!(
                "Unknown order status '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for recording a single order.
///
/// `amount` is entered independently of any line items and is not derived
/// from them.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: i32,
    pub order_date: NaiveDateTime,
    pub status: OrderStatus,
    pub amount: Decimal,
}

impl NewOrder {
    pub fn validate(&self) -> DomainResult<()> {
        if self.amount <= Decimal::ZERO {
            return Err(DomainError::validation("Order amount must be positive"));
        }
        if self.user_id <= 0 {
            return Err(DomainError::validation("Order must reference a user"));
        }
        Ok(())
    }
}
