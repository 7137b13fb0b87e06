pub mod concurrent;
pub mod error;
pub mod traits;

// Re-export commonly used types
pub use concurrent::ConcurrentOrderStore;
pub use error::StorageError;
pub use traits::{AppliedUpdate, BatchOutcome, OrderStore};
