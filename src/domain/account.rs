use super::amount::Points;
use super::order::UserId;

/// Running point totals for one user with private fields enforcing invariants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    user_id: UserId,
    accrued: Points,
    withdrawn: Points,
}

impl UserAccount {
    /// Create a new account with zero balance
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            accrued: Points::zero(),
            withdrawn: Points::zero(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Total credited by replenishments
    pub fn accrued(&self) -> Points {
        self.accrued
    }

    /// Total spent by withdrawals
    pub fn withdrawn(&self) -> Points {
        self.withdrawn
    }

    /// Spendable balance (derived: accrued - withdrawn)
    pub fn current(&self) -> Points {
        self.accrued.saturating_sub(self.withdrawn)
    }

    // Internal mutation methods for use by operations module
    pub(crate) fn set_accrued(&mut self, amount: Points) {
        self.accrued = amount;
    }

    pub(crate) fn set_withdrawn(&mut self, amount: Points) {
        self.withdrawn = amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_has_zero_balance() {
        let user = UserId::new();
        let account = UserAccount::new(user);

        assert_eq!(account.user_id(), user);
        assert_eq!(account.accrued(), Points::zero());
        assert_eq!(account.withdrawn(), Points::zero());
        assert_eq!(account.current(), Points::zero());
    }

    #[test]
    fn current_is_accrued_minus_withdrawn() {
        let mut account = UserAccount::new(UserId::new());
        account.set_accrued(Points::from_whole(500).unwrap());
        account.set_withdrawn(Points::from_raw(12_050));

        assert_eq!(account.current(), Points::from_raw(37_950));
    }
}
