//! Scripted in-memory accrual client for tests and local runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::classify::AccrualResponse;
use super::client::AccrualClient;
use super::error::ClientError;
use crate::domain::{AccrualResult, OrderNumber};

enum Scripted {
    Respond(AccrualResponse),
    Fail(String),
}

/// Accrual client that replays scripted responses per order.
///
/// Each lookup pops the next scripted step for the order; once the script is
/// exhausted the fallback response (204 by default) is returned.
pub struct ScriptedAccrualClient {
    scripts: DashMap<OrderNumber, VecDeque<Scripted>>,
    lookups: DashMap<OrderNumber, usize>,
    calls: AtomicUsize,
    fallback: AccrualResponse,
}

impl ScriptedAccrualClient {
    pub fn new() -> Self {
        Self {
            scripts: DashMap::new(),
            lookups: DashMap::new(),
            calls: AtomicUsize::new(0),
            fallback: AccrualResponse::no_content(),
        }
    }

    /// Response returned once an order's script runs out
    pub fn with_fallback(mut self, fallback: AccrualResponse) -> Self {
        self.fallback = fallback;
        self
    }

    /// Queue a response for the next lookup of `order`
    pub fn respond(&self, order: &OrderNumber, response: AccrualResponse) -> &Self {
        self.scripts
            .entry(order.clone())
            .or_default()
            .push_back(Scripted::Respond(response));
        self
    }

    /// Queue a 200 carrying `result` for its order
    pub fn respond_ok(&self, result: AccrualResult) -> &Self {
        let order = result.order.clone();
        self.respond(&order, AccrualResponse::ok(result))
    }

    /// Queue a transport failure for the next lookup of `order`
    pub fn fail(&self, order: &OrderNumber, reason: &str) -> &Self {
        self.scripts
            .entry(order.clone())
            .or_default()
            .push_back(Scripted::Fail(reason.to_string()));
        self
    }

    /// Total lookups made
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Lookups made for one order
    pub fn lookups_for(&self, order: &OrderNumber) -> usize {
        self.lookups.get(order).map(|n| *n).unwrap_or(0)
    }
}

impl Default for ScriptedAccrualClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccrualClient for ScriptedAccrualClient {
    async fn lookup(&self, order: &OrderNumber) -> Result<AccrualResponse, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.lookups.entry(order.clone()).or_insert(0) += 1;

        let step = self
            .scripts
            .get_mut(order)
            .and_then(|mut script| script.pop_front());

        match step {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(reason)) => Err(ClientError::Unavailable(reason)),
            None => Ok(self.fallback.clone()),
        }
    }
}
