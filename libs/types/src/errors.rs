//! Error types shared across the engine
//!
//! Comprehensive error taxonomy using thiserror. `ValidationError` is the
//! caller-visible rejection class: it is raised before any write and is
//! surfaced verbatim.

use thiserror::Error;

/// Minor-unit arithmetic errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmountError {
    #[error("Arithmetic overflow in amount calculation")]
    Overflow,

    #[error("Arithmetic underflow: {lhs} - {rhs}")]
    Underflow { lhs: u64, rhs: u64 },

    #[error("Invalid profit rate: {0}")]
    InvalidRate(String),
}

/// Stake-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StakeError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Fill would exceed stake {stake_id}: matched {matched}, amount {amount}")]
    OverFill { stake_id: String, matched: u64, amount: u64 },

    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),
}

/// Account-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccountError {
    #[error("Insufficient balance on {account_id}: required {required}, available {available}")]
    InsufficientBalance {
        account_id: String,
        required: u64,
        available: u64,
    },

    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),
}

/// Rejections returned synchronously to the caller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("Market {market_id} is not accepting stakes (status {status})")]
    MarketNotAcceptingStakes { market_id: String, status: String },

    #[error("Market {market_id} is not open (status {status})")]
    MarketNotOpen { market_id: String, status: String },

    #[error("Market {market_id} is not closed for matching (status {status})")]
    MarketNotClosed { market_id: String, status: String },

    #[error("Market {market_id} is already resolved")]
    MarketAlreadyResolved { market_id: String },

    #[error("Stake {stake_id} is not pending (status {status})")]
    StakeNotPending { stake_id: String, status: String },

    #[error("Stake amount must be positive")]
    InvalidAmount,

    #[error("Account not found: {account_id}")]
    AccountNotFound { account_id: String },

    #[error("Market not found: {market_id}")]
    MarketNotFound { market_id: String },

    #[error("Stake not found: {stake_id}")]
    StakeNotFound { stake_id: String },
}
