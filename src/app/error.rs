use std::io;
use thiserror::Error;

use crate::accrual::ClientError;
use crate::domain::DomainError;
use crate::io::IoError;
use crate::storage::StorageError;

/// Top-level application errors unifying all layer errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV IO error: {0}")]
    CsvIo(#[from] IoError),

    #[error("Accrual client error: {0}")]
    Client(#[from] ClientError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Seed import aborted: {0}")]
    ImportAborted(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}
