use async_trait::async_trait;
use tokio::io::AsyncWrite;

use super::error::StorageError;
use crate::domain::{
    AccrualResult, Balance, Order, OrderNumber, OrderStatus, Points, Transition, UserId,
    Withdrawal,
};

/// Outcome of applying one accrual result to a persisted order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedUpdate {
    pub previous: OrderStatus,
    pub current: OrderStatus,
    pub transition: Transition,
    /// Amount credited when this update created the order's replenishment
    pub replenished: Option<Points>,
}

/// Per-kind tally of one batch apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Orders whose status changed
    pub applied: usize,
    /// Subset of `applied` that replaced a different terminal status
    pub conflicts: usize,
    pub unchanged: usize,
    pub not_found: usize,
    /// Items rejected by the store, e.g. an invalid or overflowing amount
    pub failed: usize,
}

/// Trait for order persistence with pluggable storage backends.
///
/// The reconciliation pipeline only needs `find_orders_by_status` and the two
/// `apply_*` operations; the rest serves order upload and balance queries.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Register an uploaded order in `NEW` status
    async fn register_order(&self, user_id: UserId, number: OrderNumber) -> Result<(), StorageError>;

    /// Page through orders whose status is in `statuses`.
    ///
    /// Returns `StorageError::NotFound` when the page is empty.
    async fn find_orders_by_status(
        &self,
        statuses: &[OrderStatus],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Order>, StorageError>;

    /// Atomically apply status and accrual for one order, creating the
    /// replenishment on the transition to `PROCESSED`.
    ///
    /// Returns `NotFound` for an unknown order and `NoChange` when the
    /// persisted status already matches (or is terminal and the incoming one
    /// is not).
    async fn apply_accrual_result(
        &self,
        result: &AccrualResult,
    ) -> Result<AppliedUpdate, StorageError>;

    /// Apply a batch of results, skipping unknown and unchanged orders.
    ///
    /// A failing item does not fail the batch; it is counted in the outcome.
    /// `Err` means the batch as a whole could not be applied.
    async fn apply_accrual_results(
        &self,
        results: &[AccrualResult],
    ) -> Result<BatchOutcome, StorageError>;

    /// Orders uploaded by a user, newest first
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StorageError>;

    async fn balance(&self, user_id: UserId) -> Result<Balance, StorageError>;

    /// Spend points against an order number; check and debit are atomic
    async fn withdraw(
        &self,
        user_id: UserId,
        order: OrderNumber,
        sum: Points,
    ) -> Result<Withdrawal, StorageError>;

    /// Withdrawals made by a user, newest first
    async fn withdrawals(&self, user_id: UserId) -> Result<Vec<Withdrawal>, StorageError>;

    /// Async snapshot of all orders to a writer
    async fn snapshot<W>(&self, writer: W) -> Result<(), StorageError>
    where
        W: AsyncWrite + Unpin + Send;
}
