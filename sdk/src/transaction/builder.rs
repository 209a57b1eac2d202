//! The mutable draft side of a transaction.
//!
//! [`Transaction<D>`] holds the fields every transaction shares (memo, fee
//! ceiling, valid duration, optional node list and transaction id) plus an
//! operation-specific payload `D`. Setters consume and return the draft so
//! they chain:
//!
//! ```rust
//! use hiero_sdk::{AccountId, TransferTransaction};
//!
//! let draft = TransferTransaction::new()
//!     .add_hbar_transfer(AccountId::new(0, 0, 2), -10)?
//!     .add_hbar_transfer(AccountId::new(0, 0, 1001), 10)?
//!     .memo("lunch money")?;
//! assert_eq!(draft.get_memo(), "lunch money");
//! # Ok::<(), hiero_sdk::Error>(())
//! ```
//!
//! Freezing consumes the draft and returns a
//! [`FrozenTransaction`](super::FrozenTransaction), which has no setters
//! at all.

use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::frozen::FrozenTransaction;
use super::transaction_id::TransactionId;
use crate::client::Client;
use crate::config::{DEFAULT_MAX_TRANSACTION_FEE, DEFAULT_TRANSACTION_VALID_DURATION, MAX_MEMO_BYTES};
use crate::error::{Error, Result};
use crate::id::AccountId;
use crate::wire::{self, OperationBody, SchedulableTransactionBody, TransactionBody};

/// The operation-specific part of a transaction.
pub trait TransactionData: Clone + fmt::Debug + Send + Sync + 'static {
    /// Operation name for logs and errors.
    const NAME: &'static str;

    /// Fee ceiling used when the caller doesn't set one.
    const DEFAULT_MAX_TRANSACTION_FEE: u64 = DEFAULT_MAX_TRANSACTION_FEE;

    /// Projects the payload into its wire form. Must be deterministic.
    fn to_operation_body(&self) -> OperationBody;
}

/// A transaction that can still be edited.
#[derive(Debug, Clone)]
pub struct Transaction<D> {
    pub(crate) data: D,
    memo: String,
    max_transaction_fee: Option<u64>,
    valid_duration: Duration,
    node_account_ids: Option<Vec<AccountId>>,
    transaction_id: Option<TransactionId>,
}

impl<D: TransactionData + Default> Default for Transaction<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: TransactionData + Default> Transaction<D> {
    pub fn new() -> Self {
        Self::from_data(D::default())
    }
}

impl<D: TransactionData> Transaction<D> {
    pub(crate) fn from_data(data: D) -> Self {
        Self {
            data,
            memo: String::new(),
            max_transaction_fee: None,
            valid_duration: DEFAULT_TRANSACTION_VALID_DURATION,
            node_account_ids: None,
            transaction_id: None,
        }
    }

    /// The operation payload, read-only.
    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn get_memo(&self) -> &str {
        &self.memo
    }

    /// Sets the memo. At most 100 bytes of UTF-8.
    pub fn memo(mut self, memo: impl Into<String>) -> Result<Self> {
        let memo = memo.into();
        if memo.len() > MAX_MEMO_BYTES {
            return Err(Error::InvalidArgument(format!(
                "memo is {} bytes, the limit is {MAX_MEMO_BYTES}",
                memo.len()
            )));
        }
        self.memo = memo;
        Ok(self)
    }

    /// The fee ceiling in tinybars, falling back to the operation default.
    pub fn get_max_transaction_fee(&self) -> u64 {
        self.max_transaction_fee.unwrap_or(D::DEFAULT_MAX_TRANSACTION_FEE)
    }

    pub fn max_transaction_fee(mut self, tinybars: u64) -> Self {
        self.max_transaction_fee = Some(tinybars);
        self
    }

    pub fn get_transaction_valid_duration(&self) -> Duration {
        self.valid_duration
    }

    /// How long after its valid start the network will accept this
    /// transaction. Whole seconds only; anything finer is dropped.
    pub fn transaction_valid_duration(mut self, duration: Duration) -> Result<Self> {
        if duration.as_secs() == 0 {
            return Err(Error::InvalidArgument(
                "transaction valid duration must be at least one second".into(),
            ));
        }
        self.valid_duration = duration;
        Ok(self)
    }

    pub fn get_node_account_ids(&self) -> Option<&[AccountId]> {
        self.node_account_ids.as_deref()
    }

    /// Pins the transaction to these nodes instead of the whole network.
    pub fn node_account_ids(mut self, node_account_ids: Vec<AccountId>) -> Result<Self> {
        if node_account_ids.is_empty() {
            return Err(Error::InvalidArgument("node account id list is empty".into()));
        }
        self.node_account_ids = Some(node_account_ids);
        Ok(self)
    }

    pub fn get_transaction_id(&self) -> Option<TransactionId> {
        self.transaction_id
    }

    /// Uses this id instead of generating one from the operator at freeze.
    pub fn transaction_id(mut self, transaction_id: TransactionId) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }

    /// The body a node would see, for `node_account_id`. Needs a transaction
    /// id already set.
    pub fn build_transaction_body(&self, node_account_id: AccountId) -> Result<TransactionBody> {
        let transaction_id = self.transaction_id.ok_or_else(|| {
            Error::IllegalState("transaction id must be set before building a body".into())
        })?;
        Ok(self.body_for(transaction_id, node_account_id))
    }

    /// The body as it would appear wrapped in a schedule: no id, no node.
    pub fn build_scheduled_body(&self) -> SchedulableTransactionBody {
        SchedulableTransactionBody {
            transaction_fee: self.get_max_transaction_fee(),
            memo: self.memo.clone(),
            operation: self.data.to_operation_body(),
        }
    }

    pub(crate) fn body_for(&self, transaction_id: TransactionId, node_account_id: AccountId) -> TransactionBody {
        TransactionBody {
            transaction_id: transaction_id.to_wire(),
            node_account_id,
            transaction_fee: self.get_max_transaction_fee(),
            transaction_valid_duration_secs: self.valid_duration.as_secs() as i64,
            memo: self.memo.clone(),
            operation: self.data.to_operation_body(),
        }
    }

    /// Freezes against `client`: nodes default to the whole network starting
    /// at the next round-robin pick, and the transaction id defaults to a
    /// fresh one paid by the client's operator.
    pub fn freeze_with(mut self, client: &Client) -> Result<FrozenTransaction<D>> {
        if self.node_account_ids.is_none() {
            let network = client.network();
            if network.is_empty() {
                return Err(Error::IllegalState("cannot freeze against an empty network".into()));
            }
            let first = network.select_node().account_id();
            self.node_account_ids = Some(network.ordered_from(first));
        }
        if self.transaction_id.is_none() {
            let operator = client.operator().ok_or_else(|| {
                Error::IllegalState(
                    "no transaction id set and the client has no operator to generate one".into(),
                )
            })?;
            self.transaction_id = Some(TransactionId::generate(operator.account_id));
        }
        self.freeze()
    }

    /// Freezes without a client. Both the node list and the transaction id
    /// must already be set.
    pub fn freeze(self) -> Result<FrozenTransaction<D>> {
        let transaction_id = self.transaction_id.ok_or_else(|| {
            Error::IllegalState("cannot freeze without a transaction id".into())
        })?;
        let node_account_ids = self
            .node_account_ids
            .clone()
            .ok_or_else(|| Error::IllegalState("cannot freeze without node account ids".into()))?;

        let bodies = node_account_ids
            .iter()
            .map(|node| wire::encode(&self.body_for(transaction_id, *node)))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            operation = D::NAME,
            %transaction_id,
            nodes = node_account_ids.len(),
            "transaction frozen"
        );
        Ok(FrozenTransaction::new(self, transaction_id, node_account_ids, bodies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;
    use crate::network::Network;
    use crate::timestamp::Timestamp;
    use crate::transaction::TransferTransaction;

    fn tx_id() -> TransactionId {
        TransactionId::with_valid_start(AccountId::new(0, 0, 2), Timestamp::new(1_700_000_000, 0).unwrap())
    }

    fn client(nodes: usize) -> Client {
        let addresses: Vec<String> = (0..nodes).map(|i| format!("127.0.0.1:{}", 50211 + i)).collect();
        Client::for_network(Network::from_addresses(&addresses).unwrap())
    }

    #[test]
    fn memo_limit_is_in_bytes() {
        assert!(TransferTransaction::new().memo("a".repeat(100)).is_ok());
        assert!(TransferTransaction::new().memo("a".repeat(101)).is_err());
        // 34 three-byte characters is 102 bytes.
        assert!(TransferTransaction::new().memo("€".repeat(34)).is_err());
    }

    #[test]
    fn defaults() {
        let tx = TransferTransaction::new();
        assert_eq!(tx.get_max_transaction_fee(), 100_000_000);
        assert_eq!(tx.get_transaction_valid_duration(), Duration::from_secs(120));
        assert!(tx.get_node_account_ids().is_none());
        assert!(tx.get_transaction_id().is_none());
    }

    #[test]
    fn empty_node_list_rejected() {
        assert!(matches!(
            TransferTransaction::new().node_account_ids(vec![]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn body_needs_transaction_id() {
        let tx = TransferTransaction::new();
        assert!(matches!(
            tx.build_transaction_body(AccountId::new(0, 0, 3)),
            Err(Error::IllegalState(_))
        ));
        let body = tx.transaction_id(tx_id()).build_transaction_body(AccountId::new(0, 0, 3)).unwrap();
        assert_eq!(body.node_account_id, AccountId::new(0, 0, 3));
        assert_eq!(body.transaction_valid_duration_secs, 120);
    }

    #[test]
    fn freeze_with_binds_every_node_and_generates_id() {
        let client = client(3).with_operator(AccountId::new(0, 0, 2), PrivateKey::generate());
        let frozen = TransferTransaction::new().freeze_with(&client).unwrap();
        assert_eq!(frozen.node_account_ids().len(), 3);
        assert_eq!(frozen.transaction_id().account_id, AccountId::new(0, 0, 2));
    }

    #[test]
    fn freeze_with_keeps_explicit_choices() {
        let client = client(3);
        let frozen = TransferTransaction::new()
            .node_account_ids(vec![AccountId::new(0, 0, 4)])
            .unwrap()
            .transaction_id(tx_id())
            .freeze_with(&client)
            .unwrap();
        assert_eq!(frozen.node_account_ids(), &[AccountId::new(0, 0, 4)]);
        assert_eq!(frozen.transaction_id(), tx_id());
    }

    #[test]
    fn freeze_with_without_operator_or_id_fails() {
        let err = TransferTransaction::new().freeze_with(&client(1)).unwrap_err();
        assert!(matches!(err, Error::IllegalState(_)));
    }

    #[test]
    fn bare_freeze_needs_everything() {
        assert!(TransferTransaction::new().transaction_id(tx_id()).freeze().is_err());
        assert!(TransferTransaction::new()
            .node_account_ids(vec![AccountId::new(0, 0, 3)])
            .unwrap()
            .freeze()
            .is_err());
    }

    #[test]
    fn scheduled_body_carries_fee_and_memo() {
        let body = TransferTransaction::new()
            .memo("later")
            .unwrap()
            .max_transaction_fee(42)
            .build_scheduled_body();
        assert_eq!(body.memo, "later");
        assert_eq!(body.transaction_fee, 42);
    }
}
