use tracing::{error, warn};

use crate::io::{IoError, SeedOrder};
use crate::storage::StorageError;

/// Policy for handling bad rows while importing seed orders
pub trait ErrorPolicy: Send + Sync {
    /// Handle a row that could not be read or validated.
    /// Return true to continue importing, false to abort
    fn handle_io_error(&self, error: IoError) -> bool;

    /// Handle a row the store refused.
    /// Return true to continue importing, false to abort
    fn handle_storage_error(&self, seed: &SeedOrder, error: StorageError) -> bool;
}

/// Skip bad rows and continue (logged at warn)
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipErrors;

impl ErrorPolicy for SkipErrors {
    fn handle_io_error(&self, error: IoError) -> bool {
        warn!(error = %error, "Skipping unreadable seed row");
        true
    }

    fn handle_storage_error(&self, seed: &SeedOrder, error: StorageError) -> bool {
        warn!(order = %seed.number, user = %seed.user_id, error = %error, "Skipping seed order");
        true
    }
}

/// Abort on the first bad row
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortOnError;

impl ErrorPolicy for AbortOnError {
    fn handle_io_error(&self, error: IoError) -> bool {
        error!(error = %error, "Unreadable seed row, aborting import");
        false
    }

    fn handle_storage_error(&self, seed: &SeedOrder, error: StorageError) -> bool {
        error!(order = %seed.number, error = %error, "Seed order refused, aborting import");
        false
    }
}

/// Skip bad rows without logging
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSkip;

impl ErrorPolicy for SilentSkip {
    fn handle_io_error(&self, _error: IoError) -> bool {
        true
    }

    fn handle_storage_error(&self, _seed: &SeedOrder, _error: StorageError) -> bool {
        true
    }
}
