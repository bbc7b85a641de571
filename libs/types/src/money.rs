//! Minor-unit money amounts and the fixed profit rate
//!
//! Stake amounts and balances are integers in minor currency units. The only
//! fractional quantity is the profit rate, which is a `Decimal`; profits are
//! always rounded down to the unit so that a payout can never manufacture
//! value.

use crate::errors::AmountError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Amount of money in minor currency units (e.g. cents)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Amount) -> Result<Amount, AmountError> {
        self.0
            .checked_add(rhs.0)
            .map(Amount)
            .ok_or(AmountError::Overflow)
    }

    pub fn checked_sub(self, rhs: Amount) -> Result<Amount, AmountError> {
        self.0.checked_sub(rhs.0).map(Amount).ok_or(AmountError::Underflow {
            lhs: self.0,
            rhs: rhs.0,
        })
    }

    /// Sum a sequence of amounts, failing on overflow
    pub fn checked_sum<I>(amounts: I) -> Result<Amount, AmountError>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(a))
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed fraction of the matched amount paid as profit to a winning stake
///
/// Non-negative. Odds are fixed per matched unit; the rate does not depend
/// on the size of the opposing pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct ProfitRate(Decimal);

impl ProfitRate {
    /// Create a profit rate, rejecting negative values
    pub fn new(rate: Decimal) -> Result<Self, AmountError> {
        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(AmountError::InvalidRate(rate.to_string()));
        }
        Ok(Self(rate))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Profit on a matched amount: `floor(matched * rate)`
    pub fn profit_on(&self, matched: Amount) -> Result<Amount, AmountError> {
        let raw = matched
            .as_decimal()
            .checked_mul(self.0)
            .ok_or(AmountError::Overflow)?;
        raw.floor()
            .to_u64()
            .map(Amount::new)
            .ok_or(AmountError::Overflow)
    }

    /// Total credited to a winning stake: `matched + floor(matched * rate)`
    pub fn payout_on(&self, matched: Amount) -> Result<Amount, AmountError> {
        matched.checked_add(self.profit_on(matched)?)
    }
}

impl Default for ProfitRate {
    fn default() -> Self {
        Self(Decimal::new(90, 2))
    }
}

impl TryFrom<Decimal> for ProfitRate {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProfitRate> for Decimal {
    fn from(rate: ProfitRate) -> Self {
        rate.0
    }
}

impl FromStr for ProfitRate {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate = Decimal::from_str_exact(s).map_err(|_| AmountError::InvalidRate(s.to_string()))?;
        Self::new(rate)
    }
}

impl fmt::Display for ProfitRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
