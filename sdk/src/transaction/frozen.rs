//! The frozen side of a transaction: content locked, signatures open.
//!
//! A [`FrozenTransaction`] has no setters, so once a body has been signed
//! nothing can change underneath the signature. Trying to edit one is a
//! type error:
//!
//! ```compile_fail
//! use hiero_sdk::{AccountId, TransferTransaction};
//!
//! let frozen = TransferTransaction::new().freeze().unwrap();
//! // Transfers can only be added to the draft.
//! let frozen = frozen.add_hbar_transfer(AccountId::new(0, 0, 2), -1);
//! ```
//!
//! What a frozen transaction *can* do is collect signatures, build its
//! bodies, and execute.

use bytes::Bytes;
use tracing::debug;

use super::builder::{Transaction, TransactionData};
use super::response::TransactionResponse;
use super::signing::{sign_bodies, sign_bodies_with, SignatureMap};
use super::transaction_id::TransactionId;
use crate::client::Client;
use crate::crypto::{sha384, PrivateKey, PublicKey, Signature};
use crate::error::{Error, Result};
use crate::execution::classify::classify_transaction;
use crate::execution::{execute, Executable, ExecuteOptions, Verdict};
use crate::id::AccountId;
use crate::network::Node;
use crate::wire::{self, Request, Response, SchedulableTransactionBody, SignedTransaction, TransactionBody};

/// A transaction bound to its nodes and id, ready to sign and submit.
#[derive(Debug, Clone)]
pub struct FrozenTransaction<D> {
    draft: Transaction<D>,
    transaction_id: TransactionId,
    node_account_ids: Vec<AccountId>,
    /// Canonical body bytes, parallel to `node_account_ids`.
    bodies: Vec<Vec<u8>>,
    /// One map per body.
    signatures: Vec<SignatureMap>,
}

impl<D: TransactionData> FrozenTransaction<D> {
    pub(crate) fn new(
        draft: Transaction<D>,
        transaction_id: TransactionId,
        node_account_ids: Vec<AccountId>,
        bodies: Vec<Vec<u8>>,
    ) -> Self {
        let signatures = vec![SignatureMap::new(); bodies.len()];
        Self {
            draft,
            transaction_id,
            node_account_ids,
            bodies,
            signatures,
        }
    }

    pub fn data(&self) -> &D {
        self.draft.data()
    }

    pub fn memo(&self) -> &str {
        self.draft.get_memo()
    }

    pub fn max_transaction_fee(&self) -> u64 {
        self.draft.get_max_transaction_fee()
    }

    pub fn transaction_valid_duration(&self) -> std::time::Duration {
        self.draft.get_transaction_valid_duration()
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    pub fn node_account_ids(&self) -> &[AccountId] {
        &self.node_account_ids
    }

    /// Adds a signature from `key` to every node's body. Signing again with
    /// the same key replaces the earlier signatures.
    pub fn sign(mut self, key: &PrivateKey) -> Self {
        sign_bodies(&self.bodies, &mut self.signatures, key);
        self
    }

    /// Signs with a key held elsewhere. `signer` is called once per body.
    pub fn sign_with<F>(mut self, public_key: PublicKey, signer: F) -> Self
    where
        F: Fn(&[u8]) -> Signature,
    {
        sign_bodies_with(&self.bodies, &mut self.signatures, public_key, signer);
        self
    }

    /// Whether every body already carries a signature from `public_key`.
    pub fn contains(&self, public_key: &PublicKey) -> bool {
        self.signatures.iter().all(|map| map.contains(public_key))
    }

    /// Public keys that have signed, in key order.
    pub fn signers(&self) -> Vec<PublicKey> {
        self.signatures
            .first()
            .map(|map| map.public_keys().copied().collect())
            .unwrap_or_default()
    }

    /// The signatures collected for one node's body.
    pub fn signature_map(&self, node_account_id: AccountId) -> Option<&SignatureMap> {
        self.index_of(node_account_id).map(|i| &self.signatures[i])
    }

    /// The exact bytes signed for `node_account_id`.
    pub fn body_bytes(&self, node_account_id: AccountId) -> Option<&[u8]> {
        self.index_of(node_account_id).map(|i| self.bodies[i].as_slice())
    }

    pub fn build_transaction_body(&self, node_account_id: AccountId) -> TransactionBody {
        self.draft.body_for(self.transaction_id, node_account_id)
    }

    pub fn build_scheduled_body(&self) -> SchedulableTransactionBody {
        self.draft.build_scheduled_body()
    }

    /// The signed transaction as sent to `node_account_id`.
    pub fn signed_transaction(&self, node_account_id: AccountId) -> Result<SignedTransaction> {
        let index = self.index_of(node_account_id).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "node {node_account_id} is not one of this transaction's nodes"
            ))
        })?;
        Ok(SignedTransaction {
            body_bytes: self.bodies[index].clone(),
            sig_map: self.signatures[index].to_wire(),
        })
    }

    /// SHA-384 of the signed transaction bytes sent to `node_account_id`.
    pub fn transaction_hash(&self, node_account_id: AccountId) -> Result<Vec<u8>> {
        let bytes = wire::encode(&self.signed_transaction(node_account_id)?)?;
        Ok(sha384(&bytes))
    }

    /// Submits the transaction with the client's retry settings. Signs with
    /// the operator first unless the operator key has already signed.
    pub async fn execute(&mut self, client: &Client) -> Result<TransactionResponse> {
        self.execute_with(client, &ExecuteOptions::default()).await
    }

    pub async fn execute_with(&mut self, client: &Client, options: &ExecuteOptions) -> Result<TransactionResponse> {
        if let Some(operator) = client.operator() {
            if !self.contains(&operator.private_key.public_key()) {
                debug!(transaction_id = %self.transaction_id, "signing with operator");
                sign_bodies(&self.bodies, &mut self.signatures, &operator.private_key);
            }
        }
        if self.signers().is_empty() {
            return Err(Error::IllegalState(
                "transaction has no signatures and the client has no operator".into(),
            ));
        }
        execute(client, &*self, options).await
    }

    fn index_of(&self, node_account_id: AccountId) -> Option<usize> {
        self.node_account_ids.iter().position(|id| *id == node_account_id)
    }
}

impl<D: TransactionData> Executable for FrozenTransaction<D> {
    type Output = TransactionResponse;

    fn operation(&self) -> &'static str {
        D::NAME
    }

    fn transaction_id(&self) -> Option<TransactionId> {
        Some(self.transaction_id)
    }

    fn node_account_ids(&self) -> Option<&[AccountId]> {
        Some(&self.node_account_ids)
    }

    fn make_request(&self, node: &Node) -> Result<Bytes> {
        let request = Request::SubmitTransaction(self.signed_transaction(node.account_id())?);
        Ok(Bytes::from(wire::encode(&request)?))
    }

    fn classify(&self, response: &Response) -> Verdict {
        classify_transaction(response)
    }

    fn map_response(&self, node: &Node, _response: Response) -> Result<TransactionResponse> {
        Ok(TransactionResponse {
            transaction_id: self.transaction_id,
            node_id: node.account_id(),
            hash: self.transaction_hash(node.account_id())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;
    use crate::transaction::TransferTransaction;
    use crate::transaction::TransferData;

    fn frozen() -> FrozenTransaction<TransferData> {
        TransferTransaction::new()
            .add_hbar_transfer(AccountId::new(0, 0, 2), -1)
            .unwrap()
            .add_hbar_transfer(AccountId::new(0, 0, 3), 1)
            .unwrap()
            .node_account_ids(vec![AccountId::new(0, 0, 3), AccountId::new(0, 0, 4)])
            .unwrap()
            .transaction_id(TransactionId::with_valid_start(
                AccountId::new(0, 0, 2),
                Timestamp::new(1_700_000_000, 0).unwrap(),
            ))
            .freeze()
            .unwrap()
    }

    #[test]
    fn one_body_per_node_differing_only_in_node() {
        let tx = frozen();
        let a: TransactionBody = wire::decode(tx.body_bytes(AccountId::new(0, 0, 3)).unwrap()).unwrap();
        let b: TransactionBody = wire::decode(tx.body_bytes(AccountId::new(0, 0, 4)).unwrap()).unwrap();
        assert_eq!(a.node_account_id, AccountId::new(0, 0, 3));
        assert_eq!(b.node_account_id, AccountId::new(0, 0, 4));
        assert_eq!(TransactionBody { node_account_id: a.node_account_id, ..b }, a);
    }

    #[test]
    fn bytes_match_built_body() {
        let tx = frozen();
        let node = AccountId::new(0, 0, 4);
        let rebuilt = wire::encode(&tx.build_transaction_body(node)).unwrap();
        assert_eq!(tx.body_bytes(node).unwrap(), rebuilt.as_slice());
    }

    #[test]
    fn signatures_verify_per_node() {
        let key = PrivateKey::generate();
        let tx = frozen().sign(&key);
        for node in tx.node_account_ids().to_vec() {
            let body = tx.body_bytes(node).unwrap();
            let sig = tx.signature_map(node).unwrap().get(&key.public_key()).unwrap();
            assert!(key.public_key().verify(body, sig));
        }
        assert!(tx.contains(&key.public_key()));
    }

    #[test]
    fn re_signing_same_key_keeps_one_entry() {
        let key = PrivateKey::generate();
        let other = PrivateKey::generate();
        let tx = frozen().sign(&key).sign(&other).sign(&key);
        assert_eq!(tx.signers().len(), 2);
        assert_eq!(tx.signature_map(AccountId::new(0, 0, 3)).unwrap().len(), 2);
    }

    #[test]
    fn signing_does_not_touch_body_bytes() {
        let before = frozen();
        let after = before.clone().sign(&PrivateKey::generate());
        let node = AccountId::new(0, 0, 3);
        assert_eq!(before.body_bytes(node), after.body_bytes(node));
    }

    #[test]
    fn hash_changes_with_signatures_and_is_sha384() {
        let tx = frozen();
        let node = AccountId::new(0, 0, 3);
        let unsigned = tx.transaction_hash(node).unwrap();
        let signed = tx.sign(&PrivateKey::generate()).transaction_hash(node).unwrap();
        assert_eq!(unsigned.len(), 48);
        assert_ne!(unsigned, signed);
    }

    #[test]
    fn unknown_node_is_rejected() {
        assert!(frozen().signed_transaction(AccountId::new(0, 0, 99)).is_err());
        assert!(frozen().body_bytes(AccountId::new(0, 0, 99)).is_none());
    }

    #[test]
    fn read_only_accessors_reflect_the_draft() {
        let tx = frozen();
        assert_eq!(tx.memo(), "");
        assert_eq!(tx.max_transaction_fee(), 100_000_000);
        assert_eq!(tx.data().hbar_transfers().len(), 2);
        assert_eq!(tx.build_scheduled_body().transaction_fee, 100_000_000);
    }
}
