//! Engine error taxonomy
//!
//! - `Validation`: rejected before any write, surfaced verbatim
//! - `Transient`: store conflicts outlasted the retry policy; retry later
//! - `Ledger`: store failure that is not a conflict
//! - `Invariant`: programming defect; the transaction is aborted

use matching_engine::PlanError;
use thiserror::Error;
use types::errors::{AccountError, AmountError, StakeError, ValidationError};

use crate::ledger::LedgerError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transient failure after {attempts} attempts, retry later: {last}")]
    Transient { attempts: usize, last: String },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invariant violated: {0}")]
    Invariant(String),
}

impl EngineError {
    /// Whether the retry policy should run the operation again
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Ledger(LedgerError::Conflict { .. }))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}

impl From<StakeError> for EngineError {
    fn from(err: StakeError) -> Self {
        EngineError::Invariant(err.to_string())
    }
}

impl From<AccountError> for EngineError {
    fn from(err: AccountError) -> Self {
        EngineError::Invariant(err.to_string())
    }
}

impl From<AmountError> for EngineError {
    fn from(err: AmountError) -> Self {
        EngineError::Invariant(err.to_string())
    }
}

impl From<PlanError> for EngineError {
    fn from(err: PlanError) -> Self {
        EngineError::Invariant(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_retryable() {
        let err: EngineError = LedgerError::Conflict { attempts: 3 }.into();
        assert!(err.is_retryable());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_is_not_retryable() {
        let err: EngineError = ValidationError::InvalidAmount.into();
        assert!(err.is_validation());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Validation error: Stake amount must be positive");
    }

    #[test]
    fn test_overfill_maps_to_invariant() {
        let err: EngineError = StakeError::OverFill {
            stake_id: "s".to_string(),
            matched: 11,
            amount: 10,
        }
        .into();
        assert!(matches!(err, EngineError::Invariant(_)));
        assert!(!err.is_retryable());
    }
}
