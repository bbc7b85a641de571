//! Pre-write validation
//!
//! Pure checks run inside a transaction body on the records it just read.
//! Each returns the first failing `ValidationError`; nothing is written when
//! one fails.

use types::account::Account;
use types::errors::ValidationError;
use types::ids::{AccountId, MarketId, StakeId};
use types::market::{Market, MarketStatus};
use types::money::Amount;
use types::stake::Stake;

pub fn require_positive(amount: Amount) -> Result<(), ValidationError> {
    if amount.is_zero() {
        return Err(ValidationError::InvalidAmount);
    }
    Ok(())
}

pub fn require_account(account_id: &AccountId, account: Option<Account>) -> Result<Account, ValidationError> {
    account.ok_or_else(|| ValidationError::AccountNotFound {
        account_id: account_id.to_string(),
    })
}

pub fn require_market(market_id: &MarketId, market: Option<Market>) -> Result<Market, ValidationError> {
    market.ok_or_else(|| ValidationError::MarketNotFound {
        market_id: market_id.to_string(),
    })
}

pub fn require_stake(stake_id: &StakeId, stake: Option<Stake>) -> Result<Stake, ValidationError> {
    stake.ok_or_else(|| ValidationError::StakeNotFound {
        stake_id: stake_id.to_string(),
    })
}

/// Validate a stake placement against the account and market it touches
///
/// Checks, in order:
/// 1. Market is open for stakes
/// 2. Account balance covers the amount
pub fn validate_placement(account: &Account, market: &Market, amount: Amount) -> Result<(), ValidationError> {
    require_positive(amount)?;

    if !market.is_accepting_stakes() {
        return Err(ValidationError::MarketNotAcceptingStakes {
            market_id: market.market_id.to_string(),
            status: market.status.to_string(),
        });
    }

    if amount > account.balance {
        return Err(ValidationError::InsufficientBalance {
            required: amount.as_u64(),
            available: account.balance.as_u64(),
        });
    }

    Ok(())
}

/// Only pending stakes can be cancelled
pub fn validate_cancel(stake: &Stake) -> Result<(), ValidationError> {
    if !stake.is_pending() {
        return Err(ValidationError::StakeNotPending {
            stake_id: stake.stake_id.to_string(),
            status: stake.status.to_string(),
        });
    }
    Ok(())
}

pub fn validate_close(market: &Market) -> Result<(), ValidationError> {
    if market.status != MarketStatus::Open {
        return Err(ValidationError::MarketNotOpen {
            market_id: market.market_id.to_string(),
            status: market.status.to_string(),
        });
    }
    Ok(())
}

/// Matching runs once, on a closed market
pub fn validate_matching(market: &Market) -> Result<(), ValidationError> {
    if market.status != MarketStatus::Closed {
        return Err(ValidationError::MarketNotClosed {
            market_id: market.market_id.to_string(),
            status: market.status.to_string(),
        });
    }
    Ok(())
}

/// Resolution applies once, after matching
pub fn validate_resolution(market: &Market) -> Result<(), ValidationError> {
    match market.status {
        MarketStatus::Matched => Ok(()),
        MarketStatus::Resolved => Err(ValidationError::MarketAlreadyResolved {
            market_id: market.market_id.to_string(),
        }),
        MarketStatus::Open | MarketStatus::Closed => Err(ValidationError::MarketNotClosed {
            market_id: market.market_id.to_string(),
            status: market.status.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::stake::{Side, StakeStatus};

    fn market(status: MarketStatus) -> Market {
        let mut market = Market::new(0);
        market.status = status;
        market
    }

    #[test]
    fn test_placement_passes() {
        let account = Account::new(Amount::new(100), 0);
        assert!(validate_placement(&account, &market(MarketStatus::Open), Amount::new(100)).is_ok());
    }

    #[test]
    fn test_placement_zero_amount() {
        let account = Account::new(Amount::new(100), 0);
        assert_eq!(
            validate_placement(&account, &market(MarketStatus::Open), Amount::ZERO),
            Err(ValidationError::InvalidAmount)
        );
    }

    #[test]
    fn test_placement_insufficient_balance() {
        let account = Account::new(Amount::new(99), 0);
        assert_eq!(
            validate_placement(&account, &market(MarketStatus::Open), Amount::new(100)),
            Err(ValidationError::InsufficientBalance {
                required: 100,
                available: 99
            })
        );
    }

    #[test]
    fn test_placement_on_closed_market() {
        let account = Account::new(Amount::new(100), 0);
        let err = validate_placement(&account, &market(MarketStatus::Closed), Amount::new(1)).unwrap_err();
        assert!(matches!(err, ValidationError::MarketNotAcceptingStakes { .. }));
    }

    #[test]
    fn test_cancel_requires_pending() {
        let mut stake = Stake::new(AccountId::new(), MarketId::new(), Side::Green, Amount::new(5), 1, 0);
        assert!(validate_cancel(&stake).is_ok());
        stake.transition(StakeStatus::Refunded).unwrap();
        assert!(matches!(
            validate_cancel(&stake),
            Err(ValidationError::StakeNotPending { .. })
        ));
    }

    #[test]
    fn test_matching_requires_closed() {
        assert!(validate_matching(&market(MarketStatus::Closed)).is_ok());
        for status in [MarketStatus::Open, MarketStatus::Matched, MarketStatus::Resolved] {
            assert!(matches!(
                validate_matching(&market(status)),
                Err(ValidationError::MarketNotClosed { .. })
            ));
        }
    }

    #[test]
    fn test_resolution_states() {
        assert!(validate_resolution(&market(MarketStatus::Matched)).is_ok());
        assert!(matches!(
            validate_resolution(&market(MarketStatus::Resolved)),
            Err(ValidationError::MarketAlreadyResolved { .. })
        ));
        assert!(matches!(
            validate_resolution(&market(MarketStatus::Open)),
            Err(ValidationError::MarketNotClosed { .. })
        ));
    }

    #[test]
    fn test_close_requires_open() {
        assert!(validate_close(&market(MarketStatus::Open)).is_ok());
        assert!(matches!(
            validate_close(&market(MarketStatus::Closed)),
            Err(ValidationError::MarketNotOpen { .. })
        ));
    }

    #[test]
    fn test_missing_records() {
        let id = AccountId::new();
        assert_eq!(
            require_account(&id, None),
            Err(ValidationError::AccountNotFound {
                account_id: id.to_string()
            })
        );
    }
}
