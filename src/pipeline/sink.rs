use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::SinkMode;
use super::report::SinkReport;
use crate::domain::{AccrualResult, OrderNumber, Transition};
use crate::storage::{AppliedUpdate, OrderStore, StorageError};

/// Spawn the task that persists accrual results.
///
/// A store call that has started always runs to completion; cancellation is
/// only observed while waiting for the next result or the next flush tick.
pub fn spawn_result_sink<S>(
    store: Arc<S>,
    results: mpsc::Receiver<AccrualResult>,
    mode: SinkMode,
    cancel: CancellationToken,
) -> JoinHandle<SinkReport>
where
    S: OrderStore + 'static,
{
    tokio::spawn(async move {
        let report = match mode {
            SinkMode::PerItem => run_per_item(store.as_ref(), results, &cancel).await,
            SinkMode::Batched {
                interval,
                max_batch,
            } => run_batched(store.as_ref(), results, interval, max_batch.max(1), &cancel).await,
        };

        debug!(
            applied = report.applied,
            unchanged = report.unchanged,
            failed = report.failed,
            "Result sink stopped"
        );
        report
    })
}

async fn run_per_item<S: OrderStore>(
    store: &S,
    mut results: mpsc::Receiver<AccrualResult>,
    cancel: &CancellationToken,
) -> SinkReport {
    let mut report = SinkReport::default();

    loop {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = results.recv() => match result {
                Some(result) => result,
                None => break,
            },
        };

        let outcome = store.apply_accrual_result(&result).await;
        report.record(&result, outcome);
    }

    report
}

impl SinkReport {
    fn record(&mut self, result: &AccrualResult, outcome: Result<AppliedUpdate, StorageError>) {
        match outcome {
            Ok(update) => {
                self.applied += 1;
                if update.transition == Transition::TerminalConflict {
                    self.anomalies += 1;
                    error!(
                        order = %result.order,
                        previous = %update.previous,
                        current = %update.current,
                        "Terminal order status overwritten"
                    );
                }
                match update.replenished {
                    Some(sum) => info!(
                        order = %result.order,
                        accrual = %sum,
                        "Order processed, balance replenished"
                    ),
                    None => debug!(
                        order = %result.order,
                        previous = %update.previous,
                        current = %update.current,
                        "Order status updated"
                    ),
                }
            }
            Err(StorageError::NoChange) => {
                self.unchanged += 1;
                debug!(order = %result.order, status = %result.status, "Order already up to date");
            }
            Err(StorageError::NotFound) => {
                self.not_found += 1;
                debug!(order = %result.order, "Skipping result for unknown order");
            }
            Err(e) => {
                self.failed += 1;
                error!(order = %result.order, error = %e, "Failed to apply accrual result");
            }
        }
    }
}

async fn run_batched<S: OrderStore>(
    store: &S,
    mut results: mpsc::Receiver<AccrualResult>,
    interval: Duration,
    max_batch: usize,
    cancel: &CancellationToken,
) -> SinkReport {
    let mut report = SinkReport::default();
    let mut buffer: Vec<AccrualResult> = Vec::with_capacity(max_batch);
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                if !buffer.is_empty() {
                    warn!(pending = buffer.len(), "Dropping unflushed accrual results on shutdown");
                }
                report.dropped_on_shutdown += buffer.len();
                break;
            }
            _ = ticker.tick() => {
                if !buffer.is_empty() {
                    flush(store, &mut buffer, &mut report).await;
                }
            }
            // A full buffer stops intake until a flush succeeds
            received = results.recv(), if buffer.len() < max_batch => match received {
                Some(result) => {
                    buffer.push(result);
                    if buffer.len() >= max_batch {
                        flush(store, &mut buffer, &mut report).await;
                        ticker.reset();
                    }
                }
                None => {
                    if !buffer.is_empty() {
                        flush(store, &mut buffer, &mut report).await;
                    }
                    if !buffer.is_empty() {
                        error!(pending = buffer.len(), "Final flush failed, results discarded");
                        report.dropped_on_shutdown += buffer.len();
                    }
                    break;
                }
            },
        }
    }

    report
}

/// Apply the buffered results as one batch; the buffer is kept on failure
async fn flush<S: OrderStore>(store: &S, buffer: &mut Vec<AccrualResult>, report: &mut SinkReport) {
    let batch = latest_per_order(buffer);

    match store.apply_accrual_results(&batch).await {
        Ok(outcome) => {
            report.batches += 1;
            report.applied += outcome.applied;
            report.anomalies += outcome.conflicts;
            report.unchanged += outcome.unchanged;
            report.not_found += outcome.not_found;
            report.failed += outcome.failed;
            debug!(
                received = buffer.len(),
                distinct = batch.len(),
                applied = outcome.applied,
                failed = outcome.failed,
                "Flushed accrual batch"
            );
            buffer.clear();
        }
        Err(e) => {
            report.failed += 1;
            error!(pending = buffer.len(), error = %e, "Failed to flush accrual batch");
        }
    }
}

/// Collapse the buffer to the newest result per order, in first-seen order
fn latest_per_order(buffer: &[AccrualResult]) -> Vec<AccrualResult> {
    let mut index: HashMap<&OrderNumber, usize> = HashMap::with_capacity(buffer.len());
    let mut batch: Vec<AccrualResult> = Vec::with_capacity(buffer.len());

    for result in buffer {
        match index.get(&result.order) {
            Some(&slot) => batch[slot] = result.clone(),
            None => {
                index.insert(&result.order, batch.len());
                batch.push(result.clone());
            }
        }
    }

    batch
}
