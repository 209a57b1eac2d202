//! Error types for the SDK.
//!
//! Callers see exactly one of two things from any request: a decoded result,
//! or one [`Error`]. Transport faults and retryable statuses are handled
//! inside the execution engine and only surface as the `last` cause of a
//! budget error ([`Error::MaxAttemptsExceeded`], [`Error::DeadlineExceeded`],
//! [`Error::Cancelled`]).

use std::fmt;

use thiserror::Error;

use crate::crypto::KeyError;
use crate::id::AccountId;
use crate::network::TransportError;
use crate::status::Status;
use crate::transaction::TransactionId;

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The failure observed on one physical attempt that the engine judged
/// retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    /// The round trip itself failed: refused, timed out, reset.
    #[error("transport fault on node {node}: {error}")]
    Transport {
        node: AccountId,
        error: TransportError,
    },

    /// The node answered, but with "try again later".
    #[error("node {node} returned retryable status {status}")]
    Status { node: AccountId, status: Status },
}

impl AttemptFailure {
    /// The node this attempt went to.
    pub fn node(&self) -> AccountId {
        match self {
            Self::Transport { node, .. } | Self::Status { node, .. } => *node,
        }
    }
}

/// Every terminal failure the SDK can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad caller input: wrong identifier kind, zero amount, oversized memo.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation doesn't make sense in the current lifecycle state.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The node rejected the request with a status that will never succeed.
    #[error(
        "{} failed precheck with status {status} on node {node} after {attempts} attempt(s)",
        describe_request(.transaction_id)
    )]
    Precheck {
        status: Status,
        transaction_id: Option<TransactionId>,
        node: AccountId,
        attempts: u32,
    },

    /// The transaction reached consensus but its receipt reports failure.
    #[error("receipt for transaction {transaction_id} contained error status {status}")]
    ReceiptStatus {
        status: Status,
        transaction_id: TransactionId,
    },

    /// The validity window lapsed server-side.
    #[error("request expired on node {node} with status {status} after {attempts} attempt(s)")]
    Expired {
        status: Status,
        node: AccountId,
        attempts: u32,
    },

    /// The attempt ceiling was reached while the request was still retryable.
    #[error("exceeded maximum attempts ({attempts}); last failure: {}", describe_last(.last))]
    MaxAttemptsExceeded {
        attempts: u32,
        last: Option<AttemptFailure>,
    },

    /// The caller's deadline passed before a final answer arrived.
    #[error("deadline exceeded after {attempts} attempt(s); last failure: {}", describe_last(.last))]
    DeadlineExceeded {
        attempts: u32,
        last: Option<AttemptFailure>,
    },

    /// The caller cancelled the request.
    #[error("request cancelled after {attempts} attempt(s); last failure: {}", describe_last(.last))]
    Cancelled {
        attempts: u32,
        last: Option<AttemptFailure>,
    },

    /// The wire envelope could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    #[error(transparent)]
    Key(#[from] KeyError),
}

impl Error {
    /// The ledger status behind this error, if there is one.
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Precheck { status, .. }
            | Self::ReceiptStatus { status, .. }
            | Self::Expired { status, .. } => Some(*status),
            Self::MaxAttemptsExceeded { last, .. }
            | Self::DeadlineExceeded { last, .. }
            | Self::Cancelled { last, .. } => match last {
                Some(AttemptFailure::Status { status, .. }) => Some(*status),
                _ => None,
            },
            _ => None,
        }
    }

    /// Physical attempts made before this error, for errors raised by the
    /// execution engine.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Precheck { attempts, .. }
            | Self::Expired { attempts, .. }
            | Self::MaxAttemptsExceeded { attempts, .. }
            | Self::DeadlineExceeded { attempts, .. }
            | Self::Cancelled { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// `true` for failures reported by the network rather than the caller.
    pub fn is_ledger_error(&self) -> bool {
        matches!(
            self,
            Self::Precheck { .. }
                | Self::ReceiptStatus { .. }
                | Self::Expired { .. }
                | Self::MaxAttemptsExceeded { .. }
                | Self::DeadlineExceeded { .. }
        )
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Self::Codec(e.to_string())
    }
}

fn describe_request(transaction_id: &Option<TransactionId>) -> String {
    match transaction_id {
        Some(id) => format!("transaction {id}"),
        None => "query".to_string(),
    }
}

fn describe_last(last: &Option<AttemptFailure>) -> DescribeLast<'_> {
    DescribeLast(last)
}

struct DescribeLast<'a>(&'a Option<AttemptFailure>);

impl fmt::Display for DescribeLast<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(failure) => write!(f, "{failure}"),
            None => f.write_str("none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> AccountId {
        AccountId::new(0, 0, 3)
    }

    #[test]
    fn budget_errors_report_last_cause() {
        let err = Error::MaxAttemptsExceeded {
            attempts: 3,
            last: Some(AttemptFailure::Status {
                node: node(),
                status: Status::Busy,
            }),
        };
        let msg = err.to_string();
        assert!(msg.contains("(3)"), "{msg}");
        assert!(msg.contains("BUSY"), "{msg}");
        assert!(msg.contains("0.0.3"), "{msg}");
        assert_eq!(err.status(), Some(Status::Busy));
        assert_eq!(err.attempts(), Some(3));
    }

    #[test]
    fn budget_error_without_attempts_says_none() {
        let err = Error::DeadlineExceeded {
            attempts: 0,
            last: None,
        };
        assert!(err.to_string().ends_with("last failure: none"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn transport_cause_has_no_status() {
        let err = Error::Cancelled {
            attempts: 1,
            last: Some(AttemptFailure::Transport {
                node: node(),
                error: TransportError::ConnectionRefused,
            }),
        };
        assert_eq!(err.status(), None);
        assert!(!err.is_ledger_error());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn precheck_for_query_has_no_transaction_id() {
        let err = Error::Precheck {
            status: Status::InvalidAccountId,
            transaction_id: None,
            node: node(),
            attempts: 1,
        };
        assert!(err.to_string().starts_with("query failed precheck"));
        assert!(err.is_ledger_error());
    }

    #[test]
    fn caller_errors_are_not_ledger_errors() {
        assert!(!Error::InvalidArgument("x".into()).is_ledger_error());
        assert!(!Error::IllegalState("x".into()).is_ledger_error());
        assert_eq!(Error::IllegalState("x".into()).attempts(), None);
    }
}
