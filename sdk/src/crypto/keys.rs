//! # Key Management
//!
//! Ed25519 private/public keys and signatures for transaction signing.
//!
//! Keys arrive from operators in one of two text encodings, and we accept
//! both:
//!
//! - **raw hex**: 32 bytes, 64 hex characters;
//! - **DER hex**: the same 32 bytes behind a fixed PKCS#8 (private) or SPKI
//!   (public) prefix, which is what most wallets and portals export.
//!
//! ## Security considerations
//!
//! - We use OS-level RNG (`OsRng`) for key generation.
//! - Key bytes are never logged and never appear in `Debug` output.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// PKCS#8 DER prefix in front of a 32-byte Ed25519 private key.
const ED25519_PRIVATE_DER_PREFIX: &str = "302e020100300506032b657004220420";

/// SPKI DER prefix in front of a 32-byte Ed25519 public key.
const ED25519_PUBLIC_DER_PREFIX: &str = "302a300506032b6570032100";

/// Errors that can occur while parsing key material.
///
/// Deliberately vague about *why*: leaking details about key material
/// through error messages is a classic footgun.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid private key: expected 32 bytes as raw or DER hex")]
    InvalidPrivateKey,

    #[error("invalid public key: not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// An Ed25519 private key.
///
/// Intentionally not `Serialize`. Shipping a private key somewhere should be
/// a deliberate call to [`PrivateKey::to_string_der`], not a side effect of
/// serializing a struct that happened to contain one.
///
/// # Examples
///
/// ```
/// use hiero_sdk::PrivateKey;
///
/// let key = PrivateKey::generate();
/// let sig = key.sign(b"transfer 5 hbar");
/// assert!(key.public_key().verify(b"transfer 5 hbar", &sig));
/// ```
pub struct PrivateKey {
    signing_key: SigningKey,
}

/// The public half of a key, safe to share and log.
///
/// `Ord` is derived so signature maps iterate in a stable order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicKey {
    bytes: [u8; 32],
}

/// An Ed25519 signature. Always 64 bytes when produced by this crate;
/// stored as `Vec<u8>` for serde's sake.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    bytes: Vec<u8>,
}

fn decode_prefixed(s: &str, prefix: &str) -> Option<[u8; 32]> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    let body = match s.len() {
        64 => s,
        _ => s.strip_prefix(prefix)?,
    };
    hex::decode(body).ok()?.try_into().ok()
}

impl PrivateKey {
    /// Generate a fresh key from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Build a key from its 32 secret bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    /// Parse a raw-hex or DER-hex encoded private key. A `0x` prefix is
    /// tolerated.
    pub fn from_string(s: &str) -> Result<Self, KeyError> {
        decode_prefixed(s, ED25519_PRIVATE_DER_PREFIX)
            .map(|bytes| Self::from_bytes(&bytes))
            .ok_or(KeyError::InvalidPrivateKey)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Ed25519 is deterministic: same key and message, same signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature {
            bytes: self.signing_key.sign(message).to_bytes().to_vec(),
        }
    }

    /// The 32 secret bytes. Handle with care.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn to_string_raw(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn to_string_der(&self) -> String {
        format!("{ED25519_PRIVATE_DER_PREFIX}{}", self.to_string_raw())
    }
}

impl Clone for PrivateKey {
    /// Every copy of a private key is another thing to protect. The client
    /// needs one for its operator; try not to make more.
    fn clone(&self) -> Self {
        Self::from_bytes(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(pub={})", self.public_key().to_string_raw())
    }
}

impl FromStr for PrivateKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

impl PublicKey {
    /// Validates that the bytes are a usable Ed25519 point.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Parse a raw-hex or DER-hex encoded public key.
    pub fn from_string(s: &str) -> Result<Self, KeyError> {
        let bytes =
            decode_prefixed(s, ED25519_PUBLIC_DER_PREFIX).ok_or(KeyError::InvalidPublicKey)?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Returns `false` on any failure, including malformed signatures.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let Ok(sig_bytes) = <[u8; 64]>::try_from(signature.bytes.as_slice()) else {
            return false;
        };
        verifying_key
            .verify(message, &DalekSignature::from_bytes(&sig_bytes))
            .is_ok()
    }

    pub fn to_string_raw(&self) -> String {
        hex::encode(self.bytes)
    }

    pub fn to_string_der(&self) -> String {
        format!("{ED25519_PUBLIC_DER_PREFIX}{}", self.to_string_raw())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_der())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_string_raw()[..16])
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.bytes))
    }
}
