// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Hiero SDK: Core Library
//!
//! A client for submitting signed transactions and queries to a Hiero ledger
//! network. The network is a set of independently operated nodes, any of
//! which may be busy, restarting, or simply unreachable at the moment you
//! talk to it. This crate's job is to make that somebody else's problem.
//!
//! Every request follows the same lifecycle:
//!
//! 1. **Build** a draft [`Transaction`] (mutable, cheap, no I/O).
//! 2. **Freeze** it against a [`Client`], which binds the transaction id and
//!    the candidate nodes and locks the content. Freezing consumes the draft;
//!    a [`FrozenTransaction`] has no content mutators at all.
//! 3. **Sign** it with one or more keys. Signatures are per node, keyed by
//!    public key, and re-signing replaces rather than duplicates.
//! 4. **Execute** it. The execution engine walks the candidate nodes,
//!    classifies each outcome and backs off exponentially between retries,
//!    until it gets a final answer or runs out of budget.
//!
//! ## Architecture
//!
//! - **config**: Protocol constants, default timings and well-known address books.
//! - **id**: Account, token and NFT identifiers plus the [`EntityId`] sum type.
//! - **timestamp**: Nanosecond timestamps and jittered generation.
//! - **crypto**: Ed25519 keys, signatures and hashing. Thin wrappers, no novelty.
//! - **network**: Node registry, per-request node selection and the transport seam.
//! - **wire**: The deterministic binary envelope exchanged with nodes.
//! - **execution**: Backoff policy, response classification and the retry loop.
//! - **transaction**: Draft/frozen transactions, signing and transfer lists.
//! - **query**: Receipt and balance queries, executed by the same engine.
//!
//! ## Example
//!
//! ```no_run
//! use hiero_sdk::{AccountId, Client, PrivateKey, TransferTransaction};
//!
//! # async fn run() -> hiero_sdk::Result<()> {
//! let key = PrivateKey::from_string(&std::env::var("OPERATOR_KEY").unwrap_or_default())?;
//! let client = Client::for_testnet().with_operator(AccountId::new(0, 0, 1001), key);
//!
//! let mut tx = TransferTransaction::new()
//!     .add_hbar_transfer(AccountId::new(0, 0, 1001), -500)?
//!     .add_hbar_transfer(AccountId::new(0, 0, 1002), 500)?
//!     .freeze_with(&client)?;
//!
//! let response = tx.execute(&client).await?;
//! let receipt = response.get_receipt(&client).await?;
//! println!("{} -> {}", response.transaction_id, receipt.status);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod execution;
pub mod id;
pub mod network;
pub mod query;
pub mod status;
pub mod timestamp;
pub mod transaction;
pub mod wire;

pub use client::{Client, Operator};
pub use config::ClientConfig;
pub use crypto::{PrivateKey, PublicKey, Signature};
pub use error::{AttemptFailure, Error, Result};
pub use execution::{cancellation, CancellationHandle, CancellationSignal, ExecuteOptions};
pub use id::{AccountId, EntityId, NftId, TokenId};
pub use network::{Network, Node, TcpTransport, Transport, TransportError};
pub use query::{AccountBalance, AccountBalanceQuery, TransactionReceipt, TransactionReceiptQuery};
pub use status::Status;
pub use timestamp::Timestamp;
pub use transaction::{
    FrozenTransaction, HbarTransfer, SignatureMap, TokenNftTransfer, TokenTransfer, Transaction,
    TransactionData, TransactionId, TransactionResponse, TransferData, TransferTransaction,
};
