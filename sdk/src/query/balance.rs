//! Account balance lookup.

use bytes::Bytes;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::execution::classify::classify_query;
use crate::execution::{execute, Executable, ExecuteOptions, Verdict};
use crate::id::AccountId;
use crate::network::Node;
use crate::transaction::TransactionId;
use crate::wire::{self, Query, Request, Response, ResponsePayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountBalance {
    pub account_id: AccountId,
    /// Tinybars.
    pub hbars: u64,
}

#[derive(Debug, Clone)]
pub struct AccountBalanceQuery {
    account_id: AccountId,
    node_account_ids: Option<Vec<AccountId>>,
}

impl AccountBalanceQuery {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            node_account_ids: None,
        }
    }

    pub fn node_account_ids(mut self, node_account_ids: Vec<AccountId>) -> Self {
        self.node_account_ids = Some(node_account_ids);
        self
    }

    pub async fn execute(&self, client: &Client) -> Result<AccountBalance> {
        self.execute_with(client, &ExecuteOptions::default()).await
    }

    pub async fn execute_with(&self, client: &Client, options: &ExecuteOptions) -> Result<AccountBalance> {
        execute(client, self, options).await
    }
}

impl Executable for AccountBalanceQuery {
    type Output = AccountBalance;

    fn operation(&self) -> &'static str {
        "CryptoGetAccountBalance"
    }

    fn transaction_id(&self) -> Option<TransactionId> {
        None
    }

    fn node_account_ids(&self) -> Option<&[AccountId]> {
        self.node_account_ids.as_deref()
    }

    fn make_request(&self, _node: &Node) -> Result<Bytes> {
        let request = Request::Query(Query::AccountBalance {
            account_id: self.account_id,
        });
        Ok(Bytes::from(wire::encode(&request)?))
    }

    fn classify(&self, response: &Response) -> Verdict {
        classify_query(response)
    }

    fn map_response(&self, _node: &Node, response: Response) -> Result<AccountBalance> {
        match response.payload {
            ResponsePayload::AccountBalance { hbars } => Ok(AccountBalance {
                account_id: self.account_id,
                hbars,
            }),
            other => Err(Error::Codec(format!("expected a balance, got {other:?}"))),
        }
    }
}
