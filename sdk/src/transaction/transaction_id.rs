//! Transaction identifiers: who pays, and from when the transaction is valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::id::AccountId;
use crate::timestamp::Timestamp;
use crate::wire::WireTransactionId;

/// Identifies one logical transaction across every attempt made to submit
/// it. Displayed as `0.0.2@1700000000.000000123`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId {
    pub account_id: AccountId,
    pub valid_start: Timestamp,
}

impl TransactionId {
    /// A fresh id for `account_id`, with a jittered, slightly backdated
    /// valid start so that clock skew between us and the node doesn't
    /// reject it as "from the future".
    pub fn generate(account_id: AccountId) -> Self {
        Self::with_valid_start(account_id, Timestamp::generate(true))
    }

    pub fn with_valid_start(account_id: AccountId, valid_start: Timestamp) -> Self {
        Self {
            account_id,
            valid_start,
        }
    }

    pub fn to_wire(&self) -> WireTransactionId {
        WireTransactionId {
            account_id: self.account_id,
            valid_start: self.valid_start.to_wire(),
        }
    }

    pub fn from_wire(wire: &WireTransactionId) -> Result<Self> {
        Ok(Self::with_valid_start(
            wire.account_id,
            Timestamp::from_wire(&wire.valid_start)?,
        ))
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.account_id, self.valid_start)
    }
}

impl FromStr for TransactionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (account, valid_start) = s.split_once('@').ok_or_else(|| {
            Error::InvalidArgument(format!("transaction id `{s}` is missing '@'"))
        })?;
        Ok(Self::with_valid_start(account.parse()?, valid_start.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> TransactionId {
        TransactionId::with_valid_start(
            AccountId::new(0, 0, 2),
            Timestamp::new(1_700_000_000, 123).unwrap(),
        )
    }

    #[test]
    fn display_and_parse() {
        assert_eq!(id().to_string(), "0.0.2@1700000000.000000123");
        assert_eq!("0.0.2@1700000000.000000123".parse::<TransactionId>().unwrap(), id());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("0.0.2".parse::<TransactionId>().is_err());
        assert!("0.0.x@1.0".parse::<TransactionId>().is_err());
        assert!("0.0.2@soon".parse::<TransactionId>().is_err());
    }

    #[test]
    fn wire_round_trip() {
        assert_eq!(TransactionId::from_wire(&id().to_wire()).unwrap(), id());
    }

    #[test]
    fn generated_ids_are_backdated() {
        let generated = TransactionId::generate(AccountId::new(0, 0, 2));
        assert_eq!(generated.account_id, AccountId::new(0, 0, 2));
        assert!(generated.valid_start < Timestamp::now());
    }
}
