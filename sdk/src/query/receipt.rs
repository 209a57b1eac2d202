//! Receipt lookup.
//!
//! A node answering `OK` to a submission only means it accepted the
//! transaction for consensus. The receipt says what consensus decided.
//! Until it exists the node answers `RECEIPT_NOT_FOUND` or `UNKNOWN`, both
//! of which the engine treats as "ask again later".

use bytes::Bytes;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::execution::classify::classify_receipt;
use crate::execution::{execute, Executable, ExecuteOptions, Verdict};
use crate::id::AccountId;
use crate::network::Node;
use crate::status::Status;
use crate::transaction::TransactionId;
use crate::wire::{self, Query, Request, Response, ResponsePayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub status: Status,
    pub transaction_id: TransactionId,
}

impl TransactionReceipt {
    /// Passes the receipt through if the ledger reported `SUCCESS`.
    pub fn validate_status(self) -> Result<Self> {
        if self.status == Status::Success {
            Ok(self)
        } else {
            Err(Error::ReceiptStatus {
                status: self.status,
                transaction_id: self.transaction_id,
            })
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransactionReceiptQuery {
    transaction_id: TransactionId,
    node_account_ids: Option<Vec<AccountId>>,
}

impl TransactionReceiptQuery {
    pub fn new(transaction_id: TransactionId) -> Self {
        Self {
            transaction_id,
            node_account_ids: None,
        }
    }

    /// Restricts the query to these nodes. Usually the node that accepted
    /// the transaction, which is guaranteed to know about it.
    pub fn node_account_ids(mut self, node_account_ids: Vec<AccountId>) -> Self {
        self.node_account_ids = Some(node_account_ids);
        self
    }

    /// Fetches the receipt whatever its status. See
    /// [`TransactionReceipt::validate_status`].
    pub async fn execute(&self, client: &Client) -> Result<TransactionReceipt> {
        self.execute_with(client, &ExecuteOptions::default()).await
    }

    pub async fn execute_with(&self, client: &Client, options: &ExecuteOptions) -> Result<TransactionReceipt> {
        execute(client, self, options).await
    }
}

impl Executable for TransactionReceiptQuery {
    type Output = TransactionReceipt;

    fn operation(&self) -> &'static str {
        "TransactionGetReceipt"
    }

    fn transaction_id(&self) -> Option<TransactionId> {
        Some(self.transaction_id)
    }

    fn node_account_ids(&self) -> Option<&[AccountId]> {
        self.node_account_ids.as_deref()
    }

    fn make_request(&self, _node: &Node) -> Result<Bytes> {
        let request = Request::Query(Query::TransactionReceipt {
            transaction_id: self.transaction_id.to_wire(),
        });
        Ok(Bytes::from(wire::encode(&request)?))
    }

    fn classify(&self, response: &Response) -> Verdict {
        classify_receipt(response)
    }

    fn map_response(&self, _node: &Node, response: Response) -> Result<TransactionReceipt> {
        match response.payload {
            ResponsePayload::Receipt(receipt) => Ok(TransactionReceipt {
                status: receipt.status,
                transaction_id: self.transaction_id,
            }),
            other => Err(Error::Codec(format!("expected a receipt, got {other:?}"))),
        }
    }
}
