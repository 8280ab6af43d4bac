//! Money ledger gating tower placement and upgrades.

/// Unsigned money balance; debits never drive it below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ledger {
    balance: u32,
}

impl Ledger {
    /// Creates a ledger holding the provided starting balance.
    pub(crate) const fn new(balance: u32) -> Self {
        Self { balance }
    }

    /// Current balance.
    pub(crate) const fn balance(&self) -> u32 {
        self.balance
    }

    /// Adds money to the balance, saturating at `u32::MAX`.
    pub(crate) fn credit(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Removes money when the balance covers it; otherwise nothing changes.
    pub(crate) fn debit(&mut self, amount: u32) -> bool {
        if amount > self.balance {
            return false;
        }
        self.balance -= amount;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::Ledger;

    #[test]
    fn debit_beyond_balance_fails_without_mutation() {
        let mut ledger = Ledger::new(40);
        assert!(!ledger.debit(41));
        assert_eq!(ledger.balance(), 40);
    }

    #[test]
    fn debit_of_entire_balance_reaches_zero() {
        let mut ledger = Ledger::new(40);
        assert!(ledger.debit(40));
        assert_eq!(ledger.balance(), 0);
        assert!(!ledger.debit(1));
    }

    #[test]
    fn credit_saturates() {
        let mut ledger = Ledger::new(u32::MAX - 1);
        ledger.credit(10);
        assert_eq!(ledger.balance(), u32::MAX);
    }
}
