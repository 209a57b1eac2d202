//! Response classification.
//!
//! Every decoded response lands in exactly one [`Verdict`]. The tables differ
//! per request kind: a receipt query treats "the receipt isn't ready yet" as
//! a reason to retry, while a transaction submission treats `OK` as done.

use crate::status::Status;
use crate::wire::{Response, ResponsePayload};

/// What the engine should do with a decoded response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Transient condition; back off and try another node.
    Retry(Status),
    /// Final answer; hand the response to the caller.
    Finished,
    /// Permanent failure; stop now.
    Error(Status),
    /// The request's validity window has lapsed; stop now.
    Expired(Status),
}

/// Transaction submission: `OK` means the node accepted it.
pub fn classify_transaction(response: &Response) -> Verdict {
    match response.precheck {
        status if status.is_transient() => Verdict::Retry(status),
        Status::Ok => Verdict::Finished,
        Status::TransactionExpired => Verdict::Expired(Status::TransactionExpired),
        status => Verdict::Error(status),
    }
}

/// Receipt query. Retries while the receipt is unknown or pending, and also
/// on `UNKNOWN`/`RECEIPT_NOT_FOUND` prechecks that only mean "not yet".
pub fn classify_receipt(response: &Response) -> Verdict {
    match response.precheck {
        status if status.is_transient() => return Verdict::Retry(status),
        status @ (Status::Unknown | Status::ReceiptNotFound) => return Verdict::Retry(status),
        Status::Ok => {}
        status => return Verdict::Error(status),
    }
    match &response.payload {
        ResponsePayload::Receipt(receipt) => match receipt.status {
            status @ (Status::Busy | Status::Unknown | Status::Ok | Status::ReceiptNotFound) => {
                Verdict::Retry(status)
            }
            _ => Verdict::Finished,
        },
        _ => Verdict::Error(Status::Unknown),
    }
}

/// Plain queries: transient prechecks retry, `OK` finishes.
pub fn classify_query(response: &Response) -> Verdict {
    match response.precheck {
        status if status.is_transient() => Verdict::Retry(status),
        Status::Ok => Verdict::Finished,
        status => Verdict::Error(status),
    }
}
