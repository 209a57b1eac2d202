//! Application-level status codes returned by ledger nodes.
//!
//! A node answers every request with a precheck status, and receipts carry
//! a second one describing the consensus outcome. The execution engine only
//! cares about which bucket a status falls into; callers usually care about
//! the name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Response codes, serialized by their canonical `SCREAMING_SNAKE_CASE` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    Success,
    Busy,
    Unknown,
    PlatformNotActive,
    PlatformTransactionNotCreated,
    ReceiptNotFound,
    TransactionExpired,
    InvalidTransactionStart,
    InvalidSignature,
    InvalidAccountId,
    InvalidNodeAccount,
    InvalidTokenId,
    InsufficientPayerBalance,
    InsufficientAccountBalance,
    InsufficientTxFee,
    DuplicateTransaction,
    PayerAccountNotFound,
    AccountRepeatedInAccountAmounts,
    InvalidAccountAmounts,
    TransferListSizeLimitExceeded,
    MemoTooLong,
    SpenderDoesNotHaveAllowance,
    UnexpectedTokenDecimals,
}

impl Status {
    const ALL: [Status; 24] = [
        Status::Ok,
        Status::Success,
        Status::Busy,
        Status::Unknown,
        Status::PlatformNotActive,
        Status::PlatformTransactionNotCreated,
        Status::ReceiptNotFound,
        Status::TransactionExpired,
        Status::InvalidTransactionStart,
        Status::InvalidSignature,
        Status::InvalidAccountId,
        Status::InvalidNodeAccount,
        Status::InvalidTokenId,
        Status::InsufficientPayerBalance,
        Status::InsufficientAccountBalance,
        Status::InsufficientTxFee,
        Status::DuplicateTransaction,
        Status::PayerAccountNotFound,
        Status::AccountRepeatedInAccountAmounts,
        Status::InvalidAccountAmounts,
        Status::TransferListSizeLimitExceeded,
        Status::MemoTooLong,
        Status::SpenderDoesNotHaveAllowance,
        Status::UnexpectedTokenDecimals,
    ];

    /// Canonical wire name, e.g. `INSUFFICIENT_PAYER_BALANCE`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Success => "SUCCESS",
            Self::Busy => "BUSY",
            Self::Unknown => "UNKNOWN",
            Self::PlatformNotActive => "PLATFORM_NOT_ACTIVE",
            Self::PlatformTransactionNotCreated => "PLATFORM_TRANSACTION_NOT_CREATED",
            Self::ReceiptNotFound => "RECEIPT_NOT_FOUND",
            Self::TransactionExpired => "TRANSACTION_EXPIRED",
            Self::InvalidTransactionStart => "INVALID_TRANSACTION_START",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::InvalidAccountId => "INVALID_ACCOUNT_ID",
            Self::InvalidNodeAccount => "INVALID_NODE_ACCOUNT",
            Self::InvalidTokenId => "INVALID_TOKEN_ID",
            Self::InsufficientPayerBalance => "INSUFFICIENT_PAYER_BALANCE",
            Self::InsufficientAccountBalance => "INSUFFICIENT_ACCOUNT_BALANCE",
            Self::InsufficientTxFee => "INSUFFICIENT_TX_FEE",
            Self::DuplicateTransaction => "DUPLICATE_TRANSACTION",
            Self::PayerAccountNotFound => "PAYER_ACCOUNT_NOT_FOUND",
            Self::AccountRepeatedInAccountAmounts => "ACCOUNT_REPEATED_IN_ACCOUNT_AMOUNTS",
            Self::InvalidAccountAmounts => "INVALID_ACCOUNT_AMOUNTS",
            Self::TransferListSizeLimitExceeded => "TRANSFER_LIST_SIZE_LIMIT_EXCEEDED",
            Self::MemoTooLong => "MEMO_TOO_LONG",
            Self::SpenderDoesNotHaveAllowance => "SPENDER_DOES_NOT_HAVE_ALLOWANCE",
            Self::UnexpectedTokenDecimals => "UNEXPECTED_TOKEN_DECIMALS",
        }
    }

    /// Statuses a node uses to say "not now, try someone else".
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Busy | Self::PlatformNotActive | Self::PlatformTransactionNotCreated
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Status {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.name() == s)
            .ok_or_else(|| crate::Error::InvalidArgument(format!("unknown status: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde_name() {
        for status in Status::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn parse_round_trips_names() {
        for status in Status::ALL {
            assert_eq!(status.name().parse::<Status>().unwrap(), status);
        }
        assert!("NOT_A_STATUS".parse::<Status>().is_err());
    }

    #[test]
    fn transient_set() {
        assert!(Status::Busy.is_transient());
        assert!(Status::PlatformNotActive.is_transient());
        assert!(Status::PlatformTransactionNotCreated.is_transient());
        assert!(!Status::Ok.is_transient());
        assert!(!Status::Unknown.is_transient());
        assert!(!Status::InvalidSignature.is_transient());
    }
}
