//! Stake, account and market identifiers
//!
//! Each id wraps a UUID v7. The leading 48 bits are a millisecond
//! timestamp, so ids minted by one process sort roughly by creation time.
//! Placement order is still taken from the ledger sequence, never from ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Rebuild an id read back from storage or a report
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

uuid_id!(
    /// A single red or green stake
    StakeId
);

uuid_id!(
    /// Balance holder that places stakes and receives refunds and payouts
    AccountId
);

uuid_id!(
    /// One two-sided event, from opening through resolution
    MarketId
);
