use std::sync::Arc;

use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::config::AppConfig;
use super::error::AppError;
use crate::accrual::HttpAccrualClient;
use crate::io::{OrderSeedStream, write_snapshot};
use crate::pipeline::{PipelineReport, ReconciliationPipeline};
use crate::seed::{AbortOnError, ImportSession, SkipErrors};
use crate::storage::ConcurrentOrderStore;

/// Seed the store, reconcile until `shutdown` fires, then write the final
/// order snapshot to `writer`.
pub async fn run_service<W>(
    config: AppConfig,
    mut writer: W,
    shutdown: CancellationToken,
) -> Result<PipelineReport, AppError>
where
    W: AsyncWrite + Unpin + Send,
{
    config.validate()?;
    let store = Arc::new(ConcurrentOrderStore::new());

    if let Some(path) = &config.seed {
        let stream = OrderSeedStream::from_file(path).await?;
        let completed = if config.strict_seed {
            ImportSession::new(Arc::clone(&store), AbortOnError)
                .process_stream(stream)
                .await
        } else {
            ImportSession::new(Arc::clone(&store), SkipErrors)
                .process_stream(stream)
                .await
        };
        if !completed {
            return Err(AppError::ImportAborted(path.display().to_string()));
        }
    }

    let client = Arc::new(HttpAccrualClient::new(config.client_config())?);
    info!(
        accrual = client.base_url(),
        orders = store.order_count(),
        "Accrual reconciliation starting"
    );

    let report = ReconciliationPipeline::new(Arc::clone(&store), client, config.pipeline_config())
        .run(shutdown)
        .await;

    write_snapshot(store.as_ref(), &mut writer).await?;
    Ok(report)
}
