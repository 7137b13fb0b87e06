/// Counters from the order source stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub queries: usize,
    pub orders_emitted: usize,
    pub storage_errors: usize,
}

/// Counters from the accrual fetcher stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetcherReport {
    pub lookups: usize,
    pub results_emitted: usize,
    pub not_registered: usize,
    pub rate_limited: usize,
    pub rejected: usize,
    pub failed: usize,
}

/// Counters from the result sink stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub applied: usize,
    /// Already current, stale, or (in batched mode) unknown orders
    pub unchanged: usize,
    pub not_found: usize,
    /// Terminal statuses overwritten by a different terminal status
    pub anomalies: usize,
    pub failed: usize,
    pub batches: usize,
    /// Buffered results discarded at cancellation (batched mode)
    pub dropped_on_shutdown: usize,
}

/// Results from one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub source: SourceReport,
    pub fetcher: FetcherReport,
    pub sink: SinkReport,
    /// Stages whose task panicked or was aborted
    pub failed_stages: usize,
}

impl PipelineReport {
    /// Check if every stage wound down on its own
    pub fn all_stages_completed(&self) -> bool {
        self.failed_stages == 0
    }
}
