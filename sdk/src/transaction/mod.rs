//! # Transaction Module
//!
//! Building, freezing, signing and submitting transactions.
//!
//! ## Lifecycle
//!
//! 1. **Build**: edit a draft [`Transaction<D>`], e.g. a
//!    [`TransferTransaction`].
//! 2. **Freeze**: [`Transaction::freeze_with`] binds the node list and the
//!    transaction id, serializes one body per node, and hands back a
//!    [`FrozenTransaction<D>`]. The draft is consumed.
//! 3. **Sign**: [`FrozenTransaction::sign`] once per required key.
//! 4. **Execute**: [`FrozenTransaction::execute`] runs the retry loop and
//!    returns a [`TransactionResponse`].
//! 5. **Receipt**: [`TransactionResponse::get_receipt`] asks whether the
//!    ledger applied it.
//!
//! ```text
//! builder.rs         Transaction<D> draft and the TransactionData trait
//! frozen.rs          FrozenTransaction<D>: signatures, bodies, execution
//! signing.rs         per-node SignatureMap
//! transfer.rs        TransferData and its accumulation rules
//! transaction_id.rs  payer account + valid start
//! response.rs        TransactionResponse and receipt lookup
//! ```

pub mod builder;
pub mod frozen;
pub mod response;
pub mod signing;
pub mod transaction_id;
pub mod transfer;

pub use builder::{Transaction, TransactionData};
pub use frozen::FrozenTransaction;
pub use response::TransactionResponse;
pub use signing::SignatureMap;
pub use transaction_id::TransactionId;
pub use transfer::{HbarTransfer, TokenNftTransfer, TokenTransfer, TransferData, TransferTransaction};
