pub mod classify;
pub mod client;
pub mod error;
pub mod mock;

// Re-export commonly used types
pub use classify::{AccrualResponse, Verdict, classify};
pub use client::{AccrualClient, AccrualClientConfig, HttpAccrualClient};
pub use error::ClientError;
pub use mock::ScriptedAccrualClient;
