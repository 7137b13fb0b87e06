use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use super::config::PipelineConfig;
use super::report::SourceReport;
use crate::domain::{Order, OrderStatus};
use crate::storage::{OrderStore, StorageError};

/// Spawn the task that pages through non-terminal orders and feeds them
/// downstream.
///
/// The channel is created before the task starts; dropping the task's sender
/// (on cancellation or when the receiver goes away) closes it.
pub fn spawn_order_source<S>(
    store: Arc<S>,
    config: &PipelineConfig,
    cancel: CancellationToken,
) -> (mpsc::Receiver<Order>, JoinHandle<SourceReport>)
where
    S: OrderStore + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let limit = config.page_limit;
    let idle = config.idle_interval;

    let handle = tokio::spawn(async move {
        let mut report = SourceReport::default();
        let mut offset = 0;

        'scan: loop {
            let page = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                page = store.find_orders_by_status(&OrderStatus::NON_TERMINAL, limit, offset) => page,
            };
            report.queries += 1;

            let orders = match page {
                Ok(orders) => orders,
                Err(StorageError::NotFound) => {
                    debug!(offset, "No pending orders, restarting scan after pause");
                    offset = 0;
                    if !pause(&cancel, idle).await {
                        break;
                    }
                    continue;
                }
                Err(e) => {
                    report.storage_errors += 1;
                    error!(offset, limit, error = %e, "Failed to query pending orders");
                    if !pause(&cancel, idle).await {
                        break;
                    }
                    continue;
                }
            };

            let fetched = orders.len();
            trace!(offset, fetched, "Fetched page of pending orders");

            for order in orders {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break 'scan,
                    sent = tx.send(order) => {
                        if sent.is_err() {
                            debug!("Order channel closed by consumer");
                            break 'scan;
                        }
                        report.orders_emitted += 1;
                    }
                }
            }

            if fetched < limit {
                offset = 0;
                if !pause(&cancel, idle).await {
                    break;
                }
            } else {
                offset += limit;
            }
        }

        debug!(
            queries = report.queries,
            emitted = report.orders_emitted,
            "Order source stopped"
        );
        report
    });

    (rx, handle)
}

/// Sleep for `idle`; false when cancelled first
async fn pause(cancel: &CancellationToken, idle: Duration) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(idle) => true,
    }
}
