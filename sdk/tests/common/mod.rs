//! A scripted in-memory ledger for integration tests.
//!
//! Every node answers like a healthy ledger unless a script says otherwise:
//! submissions get `OK`, receipt queries get `SUCCESS`, balance queries get
//! the configured balance. Scripts are per node and consumed in order.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::time::Instant;

use hiero_sdk::wire::{self, Query, Request, Response, ResponsePayload, SignedTransaction, WireReceipt};
use hiero_sdk::{AccountId, Client, Network, Node, PrivateKey, Status, Transport, TransportError};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Fault(TransportError),
    Precheck(Status),
    Receipt(Status),
}

#[derive(Debug, Clone)]
pub struct Call {
    pub node: AccountId,
    pub at: Instant,
    pub request: Request,
}

impl Call {
    pub fn submitted(&self) -> Option<&SignedTransaction> {
        match &self.request {
            Request::SubmitTransaction(signed) => Some(signed),
            Request::Query(_) => None,
        }
    }
}

#[derive(Default)]
pub struct MockLedger {
    scripts: Mutex<HashMap<AccountId, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
    balance: Mutex<u64>,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues `replies` for `node`, after anything already queued.
    pub fn script(&self, node: u64, replies: impl IntoIterator<Item = Reply>) {
        self.scripts
            .lock()
            .entry(AccountId::new(0, 0, node))
            .or_default()
            .extend(replies);
    }

    pub fn set_balance(&self, hbars: u64) {
        *self.balance.lock() = hbars;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn nodes_called(&self) -> Vec<u64> {
        self.calls.lock().iter().map(|c| c.node.num).collect()
    }

    fn default_reply(&self, request: &Request) -> Response {
        match request {
            Request::SubmitTransaction(_) => Response::precheck(Status::Ok),
            Request::Query(Query::TransactionReceipt { .. }) => receipt(Status::Success),
            Request::Query(Query::AccountBalance { .. }) => Response {
                precheck: Status::Ok,
                payload: ResponsePayload::AccountBalance {
                    hbars: *self.balance.lock(),
                },
            },
        }
    }
}

fn receipt(status: Status) -> Response {
    Response {
        precheck: Status::Ok,
        payload: ResponsePayload::Receipt(WireReceipt { status }),
    }
}

#[async_trait]
impl Transport for MockLedger {
    async fn call(&self, node: &Node, request: Bytes) -> Result<Bytes, TransportError> {
        let request: Request = wire::decode(&request).map_err(|e| TransportError::Io(e.to_string()))?;
        self.calls.lock().push(Call {
            node: node.account_id(),
            at: Instant::now(),
            request: request.clone(),
        });

        let scripted = self
            .scripts
            .lock()
            .get_mut(&node.account_id())
            .and_then(VecDeque::pop_front);
        let response = match scripted {
            None => self.default_reply(&request),
            Some(Reply::Fault(error)) => return Err(error),
            Some(Reply::Precheck(status)) => Response::precheck(status),
            Some(Reply::Receipt(status)) => receipt(status),
        };
        wire::encode(&response)
            .map(Bytes::from)
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}

pub const OPERATOR: AccountId = AccountId::new(0, 0, 2);

/// A client over `nodes` mock nodes (`0.0.3` onward) with a fixed operator
/// key.
pub fn client(ledger: &Arc<MockLedger>, nodes: usize) -> Client {
    let addresses: Vec<String> = (0..nodes).map(|i| format!("10.0.0.{}:50211", i + 1)).collect();
    let network = Network::from_addresses(&addresses).unwrap();
    Client::with_transport(network, ledger.clone()).with_operator(OPERATOR, operator_key())
}

pub fn operator_key() -> PrivateKey {
    PrivateKey::from_bytes(&[7u8; 32])
}
