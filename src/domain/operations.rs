use super::account::UserAccount;
use super::amount::Points;
use super::error::DomainError;
use super::order::OrderStatus;

/// What applying an incoming status to a persisted one should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Incoming status equals the persisted one
    Unchanged,
    /// Persisted status is terminal and the incoming one is not
    Stale,
    /// Regular forward move (non-terminal to anything)
    Advance,
    /// Terminal status replaced by a different terminal status.
    /// The accrual service contradicted itself; applied last-write-wins.
    TerminalConflict,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Advance | Self::TerminalConflict)
    }
}

/// Decide how an incoming status relates to the persisted one
pub fn plan_transition(current: OrderStatus, incoming: OrderStatus) -> Transition {
    if current == incoming {
        return Transition::Unchanged;
    }
    match (current.is_terminal(), incoming.is_terminal()) {
        (true, true) => Transition::TerminalConflict,
        (true, false) => Transition::Stale,
        (false, _) => Transition::Advance,
    }
}

/// Credit a replenishment to an account
pub fn apply_replenishment(account: &mut UserAccount, amount: Points) -> Result<(), DomainError> {
    if amount < Points::zero() {
        return Err(DomainError::InvalidAmount);
    }

    let accrued = account
        .accrued()
        .checked_add(amount)
        .ok_or(DomainError::Overflow)?;

    account.set_accrued(accrued);
    Ok(())
}

/// Debit a withdrawal from an account.
///
/// Check and debit happen on the same `&mut` borrow, so callers holding the
/// account's storage entry get an atomic conditional update.
pub fn apply_withdrawal(account: &mut UserAccount, amount: Points) -> Result<(), DomainError> {
    if !amount.is_positive() {
        return Err(DomainError::InvalidAmount);
    }

    if account.current() < amount {
        return Err(DomainError::InsufficientFunds);
    }

    let withdrawn = account
        .withdrawn()
        .checked_add(amount)
        .ok_or(DomainError::Overflow)?;

    account.set_withdrawn(withdrawn);
    Ok(())
}
