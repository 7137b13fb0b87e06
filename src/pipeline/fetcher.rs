use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::PipelineConfig;
use super::report::FetcherReport;
use crate::accrual::{AccrualClient, Verdict, classify};
use crate::domain::{AccrualResult, Order};

/// Spawn the task that looks up each incoming order with the accrual service
/// and forwards usable verdicts.
///
/// Nothing here is fatal: rejected, undecodable and failed lookups are logged
/// and dropped, since the order stays non-terminal and comes around again on
/// the next scan. A 429 that survives the client's own retries pauses the
/// stage for `rate_limit_backoff`.
pub fn spawn_accrual_fetcher<C>(
    client: Arc<C>,
    mut orders: mpsc::Receiver<Order>,
    config: &PipelineConfig,
    cancel: CancellationToken,
) -> (mpsc::Receiver<AccrualResult>, JoinHandle<FetcherReport>)
where
    C: AccrualClient + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let backoff = config.rate_limit_backoff;

    let handle = tokio::spawn(async move {
        let mut report = FetcherReport::default();

        loop {
            let order = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                order = orders.recv() => match order {
                    Some(order) => order,
                    None => break,
                },
            };

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                response = client.lookup(&order.number) => response,
            };
            report.lookups += 1;

            let response = match response {
                Ok(response) => response,
                Err(e) => {
                    report.failed += 1;
                    error!(order = %order.number, error = %e, "Accrual lookup failed");
                    continue;
                }
            };

            match classify(&order.number, response) {
                Verdict::Found(result) => {
                    debug!(
                        order = %result.order,
                        status = %result.status,
                        "Accrual verdict received"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        sent = tx.send(result) => {
                            if sent.is_err() {
                                debug!("Result channel closed by consumer");
                                break;
                            }
                            report.results_emitted += 1;
                        }
                    }
                }
                Verdict::NotRegistered => {
                    report.not_registered += 1;
                    info!(order = %order.number, "Order not registered with accrual service");
                }
                Verdict::RateLimited => {
                    report.rate_limited += 1;
                    warn!(
                        order = %order.number,
                        backoff_ms = backoff.as_millis() as u64,
                        "Accrual service rate limit persists, backing off"
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
                Verdict::Undecodable => {
                    report.rejected += 1;
                    warn!(order = %order.number, "Accrual response body missing or malformed");
                }
                Verdict::Mismatch { reported } => {
                    report.rejected += 1;
                    warn!(
                        order = %order.number,
                        reported = %reported,
                        "Accrual response describes a different order"
                    );
                }
                Verdict::Rejected(status) => {
                    report.rejected += 1;
                    warn!(order = %order.number, status = %status, "Unexpected accrual response");
                }
            }
        }

        debug!(
            lookups = report.lookups,
            emitted = report.results_emitted,
            "Accrual fetcher stopped"
        );
        report
    });

    (rx, handle)
}
