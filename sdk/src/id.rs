//! Ledger entity identifiers.
//!
//! Accounts and tokens are addressed by a `shard.realm.num` triple; an NFT
//! is a token id plus a serial number. All three are plain `Copy` values
//! with structural equality, so they make good map keys.
//!
//! [`EntityId`] is the closed sum of the three. APIs that take "some kind of
//! id" accept `impl Into<EntityId>` and narrow it with `TryFrom`, which turns
//! "you passed a token where an account was expected" into an
//! [`Error::InvalidArgument`] instead of a silent mix-up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// An account on the ledger: `shard.realm.num`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

/// A fungible or non-fungible token type: `shard.realm.num`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

/// One NFT: the token type plus its serial number, written `0.0.5/12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NftId {
    pub token_id: TokenId,
    pub serial: i64,
}

impl AccountId {
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }
}

impl TokenId {
    pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
        Self { shard, realm, num }
    }

    /// Shorthand for `NftId::new(self, serial)`.
    pub fn nft(self, serial: i64) -> NftId {
        NftId::new(self, serial)
    }
}

impl NftId {
    pub const fn new(token_id: TokenId, serial: i64) -> Self {
        Self { token_id, serial }
    }
}

/// Parses `shard.realm.num`. Whitespace and missing parts are errors.
fn parse_triple(s: &str, kind: &str) -> Result<(u64, u64, u64)> {
    let invalid = || Error::InvalidArgument(format!("invalid {kind} id: {s:?}"));
    let mut parts = s.split('.');
    let mut next = || -> Result<u64> {
        parts
            .next()
            .and_then(|p| p.parse::<u64>().ok())
            .ok_or_else(invalid)
    };
    let triple = (next()?, next()?, next()?);
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(triple)
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (shard, realm, num) = parse_triple(s, "account")?;
        Ok(Self::new(shard, realm, num))
    }
}

impl FromStr for TokenId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (shard, realm, num) = parse_triple(s, "token")?;
        Ok(Self::new(shard, realm, num))
    }
}

impl FromStr for NftId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (token, serial) = s
            .split_once('/')
            .ok_or_else(|| Error::InvalidArgument(format!("invalid nft id: {s:?}")))?;
        let serial = serial
            .parse::<i64>()
            .ok()
            .filter(|serial| *serial > 0)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid nft serial: {s:?}")))?;
        Ok(Self::new(token.parse()?, serial))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl fmt::Display for NftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token_id, self.serial)
    }
}

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// Any identifier the ledger knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityId {
    Account(AccountId),
    Token(TokenId),
    Nft(NftId),
}

impl EntityId {
    /// Human name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Account(_) => "account",
            Self::Token(_) => "token",
            Self::Nft(_) => "nft",
        }
    }

    fn mismatch(self, expected: &str) -> Error {
        Error::InvalidArgument(format!(
            "expected {expected} id, got {} id {self}",
            self.kind()
        ))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(id) => id.fmt(f),
            Self::Token(id) => id.fmt(f),
            Self::Nft(id) => id.fmt(f),
        }
    }
}

impl From<AccountId> for EntityId {
    fn from(id: AccountId) -> Self {
        Self::Account(id)
    }
}

impl From<TokenId> for EntityId {
    fn from(id: TokenId) -> Self {
        Self::Token(id)
    }
}

impl From<NftId> for EntityId {
    fn from(id: NftId) -> Self {
        Self::Nft(id)
    }
}

impl TryFrom<EntityId> for AccountId {
    type Error = Error;

    fn try_from(id: EntityId) -> Result<Self> {
        match id {
            EntityId::Account(account) => Ok(account),
            other => Err(other.mismatch("account")),
        }
    }
}

impl TryFrom<EntityId> for TokenId {
    type Error = Error;

    fn try_from(id: EntityId) -> Result<Self> {
        match id {
            EntityId::Token(token) => Ok(token),
            other => Err(other.mismatch("token")),
        }
    }
}

impl TryFrom<EntityId> for NftId {
    type Error = Error;

    fn try_from(id: EntityId) -> Result<Self> {
        match id {
            EntityId::Nft(nft) => Ok(nft),
            other => Err(other.mismatch("nft")),
        }
    }
}
