//! # Hashing
//!
//! A submitted transaction is identified on the ledger by the SHA-384 digest
//! of its signed bytes. That is the only hash the client computes; body
//! integrity is covered by the Ed25519 signatures.

use sha2::{Digest, Sha384};

/// Length of a SHA-384 digest in bytes.
pub const SHA384_LENGTH: usize = 48;

/// Compute the SHA-384 hash of the input data.
///
/// Returns a `Vec<u8>` rather than `[u8; 48]` because serde only derives for
/// arrays up to 32 elements, and the digest mostly ends up in serialized
/// responses anyway.
///
/// # Example
///
/// ```
/// use hiero_sdk::crypto::sha384;
///
/// let hash = sha384(b"signed transaction bytes");
/// assert_eq!(hash.len(), 48);
/// ```
pub fn sha384(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha384::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}
