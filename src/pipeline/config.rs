use std::time::Duration;

/// How the result sink persists accrual results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
    /// Apply each result as it arrives
    PerItem,
    /// Buffer results and apply them together every `interval`, or as soon as
    /// `max_batch` results are buffered. Results still buffered when the
    /// pipeline is cancelled are dropped; their orders stay non-terminal and
    /// are picked up again by the next scan.
    Batched { interval: Duration, max_batch: usize },
}

impl Default for SinkMode {
    fn default() -> Self {
        Self::PerItem
    }
}

/// Reconciliation pipeline settings, passed explicitly to the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Orders requested per storage page
    pub page_limit: usize,

    /// Pause after an exhausted pass or a failed storage query
    pub idle_interval: Duration,

    /// Pause after the accrual service keeps answering 429
    pub rate_limit_backoff: Duration,

    /// Capacity of each inter-stage channel
    pub channel_capacity: usize,

    pub sink_mode: SinkMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_limit: 100,
            idle_interval: Duration::from_secs(5),
            rate_limit_backoff: Duration::from_secs(5),
            channel_capacity: 100,
            sink_mode: SinkMode::PerItem,
        }
    }
}

impl PipelineConfig {
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    pub fn with_idle_interval(mut self, idle_interval: Duration) -> Self {
        self.idle_interval = idle_interval;
        self
    }

    pub fn with_rate_limit_backoff(mut self, backoff: Duration) -> Self {
        self.rate_limit_backoff = backoff;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_sink_mode(mut self, sink_mode: SinkMode) -> Self {
        self.sink_mode = sink_mode;
        self
    }
}
