use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, warn};

use super::error::StorageError;
use super::traits::{AppliedUpdate, BatchOutcome, OrderStore};
use crate::domain::{
    AccrualResult, Balance, Order, OrderNumber, OrderStatus, Points, Replenishment, UserAccount,
    Transition, UserId, Withdrawal, apply_replenishment, apply_withdrawal, plan_transition,
};

/// Concurrent in-memory order store using DashMap.
///
/// Lock order is orders -> replenishments -> accounts, and accounts ->
/// withdrawals. No path takes them the other way round.
pub struct ConcurrentOrderStore {
    orders: DashMap<OrderNumber, Order>,
    replenishments: DashMap<OrderNumber, Replenishment>,
    accounts: DashMap<UserId, UserAccount>,
    withdrawals: DashMap<UserId, Vec<Withdrawal>>,
}

impl ConcurrentOrderStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            orders: DashMap::new(),
            replenishments: DashMap::new(),
            accounts: DashMap::new(),
            withdrawals: DashMap::new(),
        }
    }

    /// Current state of one order
    pub fn order(&self, number: &OrderNumber) -> Option<Order> {
        self.orders.get(number).map(|r| r.value().clone())
    }

    /// Replenishment created for an order, if any
    pub fn replenishment(&self, number: &OrderNumber) -> Option<Replenishment> {
        self.replenishments.get(number).map(|r| r.value().clone())
    }

    pub fn replenishment_count(&self) -> usize {
        self.replenishments.len()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    fn apply_one(&self, result: &AccrualResult) -> Result<AppliedUpdate, StorageError> {
        let Some(mut order) = self.orders.get_mut(&result.order) else {
            warn!(order = %result.order, "Accrual update for unknown order");
            return Err(StorageError::NotFound);
        };

        let previous = order.status;
        let transition = plan_transition(previous, result.status);
        if !transition.is_applied() {
            return Err(StorageError::NoChange);
        }

        let user_id = order.user_id;
        let mut replenished = None;
        let mut accrual = order.accrual;

        if let Some(sum) = result.credited_amount() {
            match self.replenishments.entry(result.order.clone()) {
                Entry::Vacant(slot) => {
                    let mut account = self
                        .accounts
                        .entry(user_id)
                        .or_insert_with(|| UserAccount::new(user_id));
                    apply_replenishment(account.value_mut(), sum)?;
                    slot.insert(Replenishment::new(result.order.clone(), user_id, sum));
                    replenished = Some(sum);
                    accrual = Some(sum);
                }
                Entry::Occupied(existing) => {
                    // The ledger entry is immutable; keep the order consistent with it
                    accrual = Some(existing.get().sum);
                }
            }
        }

        order.status = result.status;
        order.accrual = accrual;
        order.updated_at = Utc::now();

        Ok(AppliedUpdate {
            previous,
            current: result.status,
            transition,
            replenished,
        })
    }
}

impl Default for ConcurrentOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for ConcurrentOrderStore {
    async fn register_order(&self, user_id: UserId, number: OrderNumber) -> Result<(), StorageError> {
        match self.orders.entry(number.clone()) {
            Entry::Occupied(existing) => {
                if existing.get().user_id == user_id {
                    Err(StorageError::AlreadyUploaded(number))
                } else {
                    Err(StorageError::UploadedByAnotherUser(number))
                }
            }
            Entry::Vacant(slot) => {
                debug!(order = %number, user = %user_id, "Order registered");
                slot.insert(Order::new(number, user_id));
                Ok(())
            }
        }
    }

    async fn find_orders_by_status(
        &self,
        statuses: &[OrderStatus],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Order>, StorageError> {
        let mut matching: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| statuses.contains(&entry.status))
            .map(|entry| entry.value().clone())
            .collect();

        // Stable paging order across calls
        matching.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.number.cmp(&b.number))
        });

        let page: Vec<Order> = matching.into_iter().skip(offset).take(limit).collect();
        if page.is_empty() {
            return Err(StorageError::NotFound);
        }
        Ok(page)
    }

    async fn apply_accrual_result(
        &self,
        result: &AccrualResult,
    ) -> Result<AppliedUpdate, StorageError> {
        self.apply_one(result)
    }

    async fn apply_accrual_results(
        &self,
        results: &[AccrualResult],
    ) -> Result<BatchOutcome, StorageError> {
        let mut outcome = BatchOutcome::default();
        for result in results {
            match self.apply_one(result) {
                Ok(update) => {
                    outcome.applied += 1;
                    if update.transition == Transition::TerminalConflict {
                        outcome.conflicts += 1;
                        error!(
                            order = %result.order,
                            previous = %update.previous,
                            current = %update.current,
                            "Terminal order status overwritten"
                        );
                    }
                }
                Err(StorageError::NoChange) => {
                    outcome.unchanged += 1;
                    debug!(order = %result.order, status = %result.status, "Batch item unchanged");
                }
                Err(StorageError::NotFound) => {
                    outcome.not_found += 1;
                }
                Err(e) => {
                    outcome.failed += 1;
                    error!(order = %result.order, error = %e, "Batch item failed");
                }
            }
        }
        Ok(outcome)
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StorageError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();

        if orders.is_empty() {
            return Err(StorageError::NotFound);
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn balance(&self, user_id: UserId) -> Result<Balance, StorageError> {
        Ok(self
            .accounts
            .get(&user_id)
            .map(|account| Balance {
                current: account.current(),
                withdrawn: account.withdrawn(),
            })
            .unwrap_or_default())
    }

    async fn withdraw(
        &self,
        user_id: UserId,
        order: OrderNumber,
        sum: Points,
    ) -> Result<Withdrawal, StorageError> {
        // The entry guard serialises concurrent withdrawals for this user
        let mut account = self
            .accounts
            .entry(user_id)
            .or_insert_with(|| UserAccount::new(user_id));
        apply_withdrawal(account.value_mut(), sum)?;

        let withdrawal = Withdrawal {
            order,
            user_id,
            sum,
            processed_at: Utc::now(),
        };
        self.withdrawals
            .entry(user_id)
            .or_default()
            .push(withdrawal.clone());

        debug!(user = %user_id, order = %withdrawal.order, sum = %sum, "Points withdrawn");
        Ok(withdrawal)
    }

    async fn withdrawals(&self, user_id: UserId) -> Result<Vec<Withdrawal>, StorageError> {
        let withdrawals: Vec<Withdrawal> = self
            .withdrawals
            .get(&user_id)
            .map(|list| list.iter().rev().cloned().collect())
            .unwrap_or_default();

        if withdrawals.is_empty() {
            return Err(StorageError::NotFound);
        }
        Ok(withdrawals)
    }

    async fn snapshot<W>(&self, mut writer: W) -> Result<(), StorageError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        // Collect first so no shard lock is held across an await
        let mut orders: Vec<Order> = self.orders.iter().map(|e| e.value().clone()).collect();
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.number.cmp(&b.number))
        });

        writer.write_all(b"order,user,status,accrual\n").await?;
        for order in orders {
            let line = format!(
                "{},{},{},{}\n",
                order.number,
                order.user_id,
                order.status,
                order
                    .accrual
                    .map(|a| a.to_decimal_string())
                    .unwrap_or_default()
            );
            writer.write_all(line.as_bytes()).await?;
        }

        writer.flush().await?;
        Ok(())
    }
}
