//! Account and balance types
//!
//! An account holds one non-negative balance in minor units. It is mutated
//! only by placement debits and by refund or payout credits.

use crate::errors::AccountError;
use crate::ids::AccountId;
use crate::money::Amount;
use serde::{Deserialize, Serialize};

/// Account structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub balance: Amount,
    pub created_at: i64,
    pub updated_at: i64,
    pub version: u64,
}

impl Account {
    /// Create a new account with an opening balance
    pub fn new(balance: Amount, timestamp: i64) -> Self {
        Self {
            account_id: AccountId::new(),
            balance,
            created_at: timestamp,
            updated_at: timestamp,
            version: 0,
        }
    }

    /// Debit the balance (stake placement)
    ///
    /// Leaves the account unchanged if the balance is insufficient.
    pub fn debit(&mut self, amount: Amount, timestamp: i64) -> Result<(), AccountError> {
        if amount > self.balance {
            return Err(AccountError::InsufficientBalance {
                account_id: self.account_id.to_string(),
                required: amount.as_u64(),
                available: self.balance.as_u64(),
            });
        }
        self.balance = self.balance.checked_sub(amount)?;
        self.updated_at = timestamp;
        Ok(())
    }

    /// Credit the balance (refund, residual or payout)
    pub fn credit(&mut self, amount: Amount, timestamp: i64) -> Result<(), AccountError> {
        self.balance = self.balance.checked_add(amount)?;
        self.updated_at = timestamp;
        Ok(())
    }
}
