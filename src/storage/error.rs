use std::io;
use thiserror::Error;

use crate::domain::{DomainError, OrderNumber};

/// Storage-level errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Entity not found")]
    NotFound,

    #[error("Data is already up to date")]
    NoChange,

    #[error("Order {0} was already uploaded by this user")]
    AlreadyUploaded(OrderNumber),

    #[error("Order {0} was uploaded by another user")]
    UploadedByAnotherUser(OrderNumber),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),
}
