pub mod config;
pub mod fetcher;
pub mod reconciler;
pub mod report;
pub mod sink;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{PipelineConfig, SinkMode};
pub use fetcher::spawn_accrual_fetcher;
pub use reconciler::ReconciliationPipeline;
pub use report::{FetcherReport, PipelineReport, SinkReport, SourceReport};
pub use sink::spawn_result_sink;
pub use source::spawn_order_source;
