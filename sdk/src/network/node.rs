//! A single ledger node.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::id::AccountId;

/// One endpoint able to accept requests: the node's account id (which the
/// transaction body names as its target) and where to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    account_id: AccountId,
    address: String,
}

impl Node {
    /// `address` must be `host:port` with a numeric port.
    pub fn new(account_id: AccountId, address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        let valid = address
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
        if !valid {
            return Err(Error::InvalidArgument(format!(
                "invalid node address {address:?}: expected host:port"
            )));
        }
        Ok(Self {
            account_id,
            address,
        })
    }

    /// For compile-time address books, which are known to be well formed.
    pub(crate) fn from_static(num: u64, address: &'static str) -> Self {
        Self {
            account_id: AccountId::new(0, 0, num),
            address: address.to_string(),
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.account_id, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_host_port() {
        let node = Node::new(AccountId::new(0, 0, 3), "127.0.0.1:50211").unwrap();
        assert_eq!(node.address(), "127.0.0.1:50211");
        assert_eq!(node.to_string(), "0.0.3@127.0.0.1:50211");
    }

    #[test]
    fn rejects_missing_or_bad_port() {
        let id = AccountId::new(0, 0, 3);
        assert!(Node::new(id, "localhost").is_err());
        assert!(Node::new(id, "localhost:http").is_err());
        assert!(Node::new(id, ":50211").is_err());
        assert!(Node::new(id, "localhost:70000").is_err());
    }
}
