use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::error::AppError;
use crate::accrual::AccrualClientConfig;
use crate::pipeline::{PipelineConfig, SinkMode};

/// Command-line configuration for the reconciliation service.
///
/// Every flag can also come from the environment; an explicit flag wins.
#[derive(Debug, Clone, Parser)]
#[command(name = "loyalty")]
#[command(about = "Reconcile loyalty orders against the accrual service")]
#[command(version)]
pub struct AppConfig {
    /// Accrual service base address
    #[arg(
        short = 'r',
        long,
        env = "ACCRUAL_SYSTEM_ADDRESS",
        default_value = "http://localhost:8080"
    )]
    pub accrual_address: String,

    /// Seed CSV of `order,user` rows registered before the pipeline starts
    pub seed: Option<PathBuf>,

    /// Abort on the first bad seed row instead of skipping it
    #[arg(long)]
    pub strict_seed: bool,

    /// Orders fetched per storage page
    #[arg(long, env = "LOYALTY_PAGE_LIMIT", default_value_t = 100)]
    pub page_limit: usize,

    /// Pause between scans once no pending orders remain, in milliseconds
    #[arg(long, env = "LOYALTY_IDLE_INTERVAL_MS", default_value_t = 5_000)]
    pub idle_interval_ms: u64,

    /// Attempts after the first on a network error or 429
    #[arg(long, env = "LOYALTY_RETRY_COUNT", default_value_t = 3)]
    pub retry_count: usize,

    /// Wait between request attempts, in milliseconds
    #[arg(long, env = "LOYALTY_RETRY_WAIT_MS", default_value_t = 5_000)]
    pub retry_wait_ms: u64,

    /// Pause after a persistent 429, in milliseconds
    #[arg(long, env = "LOYALTY_RATE_LIMIT_BACKOFF_MS", default_value_t = 5_000)]
    pub rate_limit_backoff_ms: u64,

    /// Per-request timeout, in milliseconds
    #[arg(long, env = "LOYALTY_REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    pub request_timeout_ms: u64,

    /// Capacity of each channel between pipeline stages
    #[arg(long, env = "LOYALTY_CHANNEL_CAPACITY", default_value_t = 100)]
    pub channel_capacity: usize,

    /// Persist results in micro-batches instead of one at a time
    #[arg(long, env = "LOYALTY_BATCHED")]
    pub batched: bool,

    /// Flush interval for batched mode, in milliseconds
    #[arg(long, env = "LOYALTY_BATCH_INTERVAL_MS", default_value_t = 5_000)]
    pub batch_interval_ms: u64,

    /// Results buffered before an early flush in batched mode
    #[arg(long, env = "LOYALTY_BATCH_SIZE", default_value_t = 100)]
    pub batch_size: usize,

    /// Time allowed for the pipeline to wind down after a signal, in milliseconds
    #[arg(long, env = "LOYALTY_SHUTDOWN_GRACE_MS", default_value_t = 10_000)]
    pub shutdown_grace_ms: u64,
}

impl AppConfig {
    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        let positive = [
            ("page limit", self.page_limit),
            ("channel capacity", self.channel_capacity),
            ("batch size", self.batch_size),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(AppError::InvalidArguments(format!(
                    "{name} must be positive"
                )));
            }
        }
        if self.batched && self.batch_interval_ms == 0 {
            return Err(AppError::InvalidArguments(
                "batch interval must be positive".to_string(),
            ));
        }
        if self.accrual_address.trim().is_empty() {
            return Err(AppError::InvalidArguments(
                "accrual address is empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sink_mode(&self) -> SinkMode {
        if self.batched {
            SinkMode::Batched {
                interval: Duration::from_millis(self.batch_interval_ms),
                max_batch: self.batch_size,
            }
        } else {
            SinkMode::PerItem
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_page_limit(self.page_limit)
            .with_idle_interval(Duration::from_millis(self.idle_interval_ms))
            .with_rate_limit_backoff(Duration::from_millis(self.rate_limit_backoff_ms))
            .with_channel_capacity(self.channel_capacity)
            .with_sink_mode(self.sink_mode())
    }

    pub fn client_config(&self) -> AccrualClientConfig {
        AccrualClientConfig::default()
            .with_base_address(self.accrual_address.clone())
            .with_timeout(Duration::from_millis(self.request_timeout_ms))
            .with_retry_count(self.retry_count)
            .with_retry_wait(Duration::from_millis(self.retry_wait_ms))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}
