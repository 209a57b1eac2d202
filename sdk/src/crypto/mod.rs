//! # Cryptographic Primitives
//!
//! Every signature the SDK attaches and every transaction hash it reports
//! flows through here. Nothing clever happens in this module on purpose:
//!
//! - **Ed25519** for signatures, via `ed25519-dalek`.
//! - **SHA-384** for transaction hashes, via `sha2`, because that is what the
//!   ledger uses to name a submitted transaction.
//!
//! Everything is a thin, type-safe wrapper around audited implementations.
//! If you're tempted to optimize these functions, please reconsider.

pub mod hash;
pub mod keys;

pub use hash::sha384;
pub use keys::{KeyError, PrivateKey, PublicKey, Signature};
