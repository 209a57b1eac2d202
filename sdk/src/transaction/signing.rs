//! Signature collection for frozen transactions.
//!
//! A frozen transaction has one canonical body per node (the bodies differ
//! only in `node_account_id`), so it carries one [`SignatureMap`] per node.
//! Every signer signs every body. Maps are keyed by public key: signing
//! twice with the same key replaces the earlier signature instead of
//! stacking a duplicate.

use std::collections::BTreeMap;

use crate::crypto::{PrivateKey, PublicKey, Signature};
use crate::wire::SignaturePair;

/// Signatures over one node's body bytes, ordered by public key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureMap {
    pairs: BTreeMap<PublicKey, Signature>,
}

impl SignatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `signature` under `public_key`, returning whatever it replaced.
    pub fn insert(&mut self, public_key: PublicKey, signature: Signature) -> Option<Signature> {
        self.pairs.insert(public_key, signature)
    }

    pub fn contains(&self, public_key: &PublicKey) -> bool {
        self.pairs.contains_key(public_key)
    }

    pub fn get(&self, public_key: &PublicKey) -> Option<&Signature> {
        self.pairs.get(public_key)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn public_keys(&self) -> impl Iterator<Item = &PublicKey> {
        self.pairs.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PublicKey, &Signature)> {
        self.pairs.iter()
    }

    pub fn to_wire(&self) -> Vec<SignaturePair> {
        self.pairs
            .iter()
            .map(|(key, signature)| SignaturePair {
                public_key: *key.as_bytes(),
                signature: signature.to_vec(),
            })
            .collect()
    }
}

/// Signs every body with `key`, one signature per map.
pub(crate) fn sign_bodies(bodies: &[Vec<u8>], maps: &mut [SignatureMap], key: &PrivateKey) {
    let public_key = key.public_key();
    sign_bodies_with(bodies, maps, public_key, |body| key.sign(body));
}

/// Like [`sign_bodies`], for signers that live outside this process.
pub(crate) fn sign_bodies_with<F>(
    bodies: &[Vec<u8>],
    maps: &mut [SignatureMap],
    public_key: PublicKey,
    signer: F,
) where
    F: Fn(&[u8]) -> Signature,
{
    for (body, map) in bodies.iter().zip(maps.iter_mut()) {
        map.insert(public_key, signer(body));
    }
}
