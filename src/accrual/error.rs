use thiserror::Error;

/// Errors talking to the accrual service
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid accrual service address: {0}")]
    InvalidAddress(String),

    #[error("Accrual service unavailable: {0}")]
    Unavailable(String),
}
