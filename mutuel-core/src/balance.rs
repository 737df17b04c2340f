//! Value transfer seam between the engine and the external custody layer.
//!
//! The engine never owns funds; it debits a bettor when a stake is accepted
//! and credits a winner when a claim succeeds. Both calls happen inside the
//! engine's write critical section, so an implementation must be synchronous
//! and must fail *before* touching any external state it cannot roll back.

use crate::error::{EngineError, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Atomic credit/debit of the venue's base value unit against an account.
pub trait ValueTransfer: Send + Sync {
    /// Remove `amount` from `account`. Fails without side effects if the
    /// account cannot cover it.
    fn debit(&self, account: &str, amount: u64) -> Result<()>;

    /// Add `amount` to `account`.
    fn credit(&self, account: &str, amount: u64) -> Result<()>;
}

/// In-memory account book.
///
/// Stands in for the external wallet/transfer collaborator in tests and the
/// CLI demo. Accounts are created on first deposit or credit.
#[derive(Debug, Default)]
pub struct AccountBook {
    balances: Mutex<BTreeMap<String, u64>>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fund an account out of band (the "wallet top-up" the engine never
    /// sees).
    pub fn deposit(&self, account: &str, amount: u64) {
        let mut balances = self.balances.lock().expect("account book lock poisoned");
        let entry = balances.entry(account.to_string()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Current balance of an account (0 if unknown).
    pub fn balance(&self, account: &str) -> u64 {
        let balances = self.balances.lock().expect("account book lock poisoned");
        balances.get(account).copied().unwrap_or(0)
    }
}

impl ValueTransfer for AccountBook {
    fn debit(&self, account: &str, amount: u64) -> Result<()> {
        let mut balances = self.balances.lock().expect("account book lock poisoned");
        let available = balances.get(account).copied().unwrap_or(0);
        if available < amount {
            return Err(EngineError::InsufficientBalance {
                account: account.to_string(),
                needed: amount,
                available,
            });
        }
        balances.insert(account.to_string(), available - amount);
        Ok(())
    }

    fn credit(&self, account: &str, amount: u64) -> Result<()> {
        let mut balances = self.balances.lock().expect("account book lock poisoned");
        let entry = balances.entry(account.to_string()).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| EngineError::Transfer(format!("balance overflow for {account}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_and_balance() {
        let book = AccountBook::new();
        assert_eq!(book.balance("alice"), 0);
        book.deposit("alice", 1_000);
        book.deposit("alice", 500);
        assert_eq!(book.balance("alice"), 1_500);
    }

    #[test]
    fn test_debit_insufficient() {
        let book = AccountBook::new();
        book.deposit("alice", 100);

        let err = book.debit("alice", 200).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientBalance {
                needed: 200,
                available: 100,
                ..
            }
        ));
        // Failed debit leaves the balance untouched
        assert_eq!(book.balance("alice"), 100);
    }

    #[test]
    fn test_debit_then_credit() {
        let book = AccountBook::new();
        book.deposit("alice", 1_000);
        book.debit("alice", 300).unwrap();
        book.credit("bob", 300).unwrap();
        assert_eq!(book.balance("alice"), 700);
        assert_eq!(book.balance("bob"), 300);
    }
}
