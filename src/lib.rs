//! Loyalty order accrual reconciliation.
//!
//! Orders that are not yet final are paged out of the store, looked up with
//! the external accrual service, and their status and points written back.
//! An order reaching `PROCESSED` credits its owner's balance exactly once.

pub mod accrual;
pub mod app;
pub mod domain;
pub mod io;
pub mod pipeline;
pub mod prelude;
pub mod seed;
pub mod storage;
