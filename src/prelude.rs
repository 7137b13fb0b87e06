//! Prelude module for convenient imports
//!
//! Import everything you need with: `use loyalty::prelude::*;`

// Domain types
pub use crate::domain::{
    AccrualResult, Balance, DomainError, Order, OrderNumber, OrderStatus, Points, Replenishment,
    Transition, UserAccount, UserId, Withdrawal,
};

// Storage types
pub use crate::storage::{
    AppliedUpdate, BatchOutcome, ConcurrentOrderStore, OrderStore, StorageError,
};

// Accrual service types
pub use crate::accrual::{
    AccrualClient, AccrualClientConfig, AccrualResponse, ClientError, HttpAccrualClient,
    ScriptedAccrualClient, Verdict, classify,
};

// Pipeline types
pub use crate::pipeline::{
    FetcherReport, PipelineConfig, PipelineReport, ReconciliationPipeline, SinkMode, SinkReport,
    SourceReport,
};

// IO types
pub use crate::io::{IoError, OrderSeedStream, RawOrderRecord, SeedOrder, write_snapshot};

// Seed import types
pub use crate::seed::{AbortOnError, ErrorPolicy, ImportReport, ImportSession, SilentSkip, SkipErrors};

// App types
pub use crate::app::{AppConfig, AppError, CliApp, init_tracing, run_service};
