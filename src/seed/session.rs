use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::{debug, info};

use super::policy::ErrorPolicy;
use crate::io::{IoError, SeedOrder};
use crate::storage::{OrderStore, StorageError};

/// Counters from one seed import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub registered: usize,
    /// Rows repeating an order the same user already uploaded
    pub already_registered: usize,
    pub skipped: usize,
}

/// Registers a stream of seed orders in the store
pub struct ImportSession<S, P>
where
    S: OrderStore,
    P: ErrorPolicy,
{
    store: Arc<S>,
    error_policy: P,
    report: ImportReport,
}

impl<S, P> ImportSession<S, P>
where
    S: OrderStore,
    P: ErrorPolicy,
{
    pub fn new(store: Arc<S>, error_policy: P) -> Self {
        Self {
            store,
            error_policy,
            report: ImportReport::default(),
        }
    }

    /// Import every row of `stream`.
    ///
    /// Returns false if the error policy aborted the import; rows registered
    /// before that point stay registered.
    pub async fn process_stream<St>(&mut self, mut stream: St) -> bool
    where
        St: Stream<Item = Result<SeedOrder, IoError>> + Unpin,
    {
        while let Some(row) = stream.next().await {
            let seed = match row {
                Ok(seed) => seed,
                Err(e) => {
                    self.report.skipped += 1;
                    if !self.error_policy.handle_io_error(e) {
                        return false;
                    }
                    continue;
                }
            };

            match self
                .store
                .register_order(seed.user_id, seed.number.clone())
                .await
            {
                Ok(()) => self.report.registered += 1,
                Err(StorageError::AlreadyUploaded(number)) => {
                    self.report.already_registered += 1;
                    debug!(order = %number, "Seed order already registered");
                }
                Err(e) => {
                    self.report.skipped += 1;
                    if !self.error_policy.handle_storage_error(&seed, e) {
                        return false;
                    }
                }
            }
        }

        info!(
            registered = self.report.registered,
            already_registered = self.report.already_registered,
            skipped = self.report.skipped,
            "Seed import finished"
        );
        true
    }

    pub fn report(&self) -> ImportReport {
        self.report
    }
}
