use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::config::{PipelineConfig, SinkMode};
use super::fetcher::spawn_accrual_fetcher;
use super::report::PipelineReport;
use super::sink::spawn_result_sink;
use super::source::spawn_order_source;
use crate::accrual::AccrualClient;
use crate::storage::OrderStore;

/// Wires order source, accrual fetcher and result sink into one pipeline.
///
/// The three stages share one cancellation token. Cancelling it stops every
/// stage at its next suspension point; each stage then drops its sender so
/// the stage downstream sees its channel close.
///
/// # Example
/// ```rust,ignore
/// let pipeline = ReconciliationPipeline::new(store, client, PipelineConfig::default());
/// let report = pipeline.run(shutdown.clone()).await;
/// ```
pub struct ReconciliationPipeline<S, C>
where
    S: OrderStore + 'static,
    C: AccrualClient + 'static,
{
    store: Arc<S>,
    client: Arc<C>,
    config: PipelineConfig,
}

impl<S, C> ReconciliationPipeline<S, C>
where
    S: OrderStore + 'static,
    C: AccrualClient + 'static,
{
    pub fn new(store: Arc<S>, client: Arc<C>, config: PipelineConfig) -> Self {
        Self {
            store,
            client,
            config,
        }
    }

    pub fn with_sink_mode(mut self, sink_mode: SinkMode) -> Self {
        self.config.sink_mode = sink_mode;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Start the pipeline as a background task
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<PipelineReport> {
        tokio::spawn(self.run(cancel))
    }

    /// Run until `cancel` fires and every stage has wound down
    pub async fn run(self, cancel: CancellationToken) -> PipelineReport {
        let ReconciliationPipeline {
            store,
            client,
            config,
        } = self;

        info!(
            page_limit = config.page_limit,
            channel_capacity = config.channel_capacity,
            sink_mode = ?config.sink_mode,
            "Starting reconciliation pipeline"
        );

        let (orders, source) = spawn_order_source(Arc::clone(&store), &config, cancel.clone());
        let (results, fetcher) = spawn_accrual_fetcher(client, orders, &config, cancel.clone());
        let sink = spawn_result_sink(store, results, config.sink_mode, cancel);

        let mut report = PipelineReport::default();
        report.source = join_stage("source", source.await, &mut report.failed_stages);
        report.fetcher = join_stage("fetcher", fetcher.await, &mut report.failed_stages);
        report.sink = join_stage("sink", sink.await, &mut report.failed_stages);

        info!(
            orders = report.source.orders_emitted,
            lookups = report.fetcher.lookups,
            results = report.fetcher.results_emitted,
            applied = report.sink.applied,
            unchanged = report.sink.unchanged,
            failed_stages = report.failed_stages,
            "Reconciliation pipeline stopped"
        );
        report
    }
}

fn join_stage<R: Default>(stage: &str, joined: Result<R, JoinError>, failed: &mut usize) -> R {
    joined.unwrap_or_else(|e| {
        *failed += 1;
        error!(stage, error = %e, "Pipeline stage terminated abnormally");
        R::default()
    })
}
