use thiserror::Error;

/// Domain-level errors representing business rule violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid order number: {0}")]
    InvalidOrderNumber(String),

    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    #[error("Insufficient points for withdrawal")]
    InsufficientFunds,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Arithmetic overflow")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            DomainError::InvalidOrderNumber("12a".to_string()).to_string(),
            "Invalid order number: 12a"
        );
        assert_eq!(
            DomainError::InsufficientFunds.to_string(),
            "Insufficient points for withdrawal"
        );
        assert_eq!(DomainError::InvalidAmount.to_string(), "Invalid amount");
        assert_eq!(DomainError::Overflow.to_string(), "Arithmetic overflow");
    }

    #[test]
    fn error_comparison_works() {
        assert_eq!(DomainError::Overflow, DomainError::Overflow);
        assert_ne!(DomainError::InsufficientFunds, DomainError::InvalidAmount);
    }
}
