//! What a successful submission hands back.

use crate::client::Client;
use crate::error::Result;
use crate::execution::ExecuteOptions;
use crate::id::AccountId;
use crate::query::{TransactionReceipt, TransactionReceiptQuery};
use crate::transaction::TransactionId;

/// A node accepted the transaction. Acceptance is not success: the
/// receipt says whether the ledger actually applied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResponse {
    pub transaction_id: TransactionId,
    /// The node that accepted it.
    pub node_id: AccountId,
    /// SHA-384 of the signed transaction bytes sent to `node_id`.
    pub hash: Vec<u8>,
}

impl TransactionResponse {
    pub fn hash_hex(&self) -> String {
        hex::encode(&self.hash)
    }

    /// Polls the accepting node for the receipt and fails with
    /// [`Error::ReceiptStatus`](crate::Error::ReceiptStatus) unless the
    /// ledger reports `SUCCESS`.
    pub async fn get_receipt(&self, client: &Client) -> Result<TransactionReceipt> {
        self.get_receipt_with(client, &ExecuteOptions::default()).await
    }

    pub async fn get_receipt_with(&self, client: &Client, options: &ExecuteOptions) -> Result<TransactionReceipt> {
        TransactionReceiptQuery::new(self.transaction_id)
            .node_account_ids(vec![self.node_id])
            .execute_with(client, options)
            .await?
            .validate_status()
    }
}
