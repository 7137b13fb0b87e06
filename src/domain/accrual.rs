use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::amount::Points;
use super::order::{OrderNumber, OrderStatus, UserId};

/// Verdict fetched from the accrual service for one order
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccrualResult {
    pub order: OrderNumber,
    pub status: OrderStatus,
    #[serde(default)]
    pub accrual: Option<Points>,
}

impl AccrualResult {
    pub fn new(order: OrderNumber, status: OrderStatus, accrual: Option<Points>) -> Self {
        Self {
            order,
            status,
            accrual,
        }
    }

    /// Amount to credit; only meaningful once the order is `PROCESSED`
    pub fn credited_amount(&self) -> Option<Points> {
        match self.status {
            OrderStatus::Processed => Some(self.accrual.unwrap_or_default()),
            _ => None,
        }
    }
}

/// Ledger entry crediting a user for one processed order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replenishment {
    pub order: OrderNumber,
    pub user_id: UserId,
    pub sum: Points,
    pub created_at: DateTime<Utc>,
}

impl Replenishment {
    pub fn new(order: OrderNumber, user_id: UserId, sum: Points) -> Self {
        Self {
            order,
            user_id,
            sum,
            created_at: Utc::now(),
        }
    }
}

/// Points spent by a user against an order number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdrawal {
    pub order: OrderNumber,
    pub user_id: UserId,
    pub sum: Points,
    pub processed_at: DateTime<Utc>,
}

/// Current point balance of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balance {
    pub current: Points,
    pub withdrawn: Points,
}
