pub mod account;
pub mod accrual;
pub mod amount;
pub mod error;
pub mod luhn;
pub mod operations;
pub mod order;

// Re-export commonly used types
pub use account::UserAccount;
pub use accrual::{AccrualResult, Balance, Replenishment, Withdrawal};
pub use amount::Points;
pub use error::DomainError;
pub use operations::{Transition, apply_replenishment, apply_withdrawal, plan_transition};
pub use order::{Order, OrderNumber, OrderStatus, UserId};
