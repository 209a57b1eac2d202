//! # Node Registry
//!
//! [`Network`] owns the node list and an advisory health record per node.
//! It never removes a node: a node that failed is merely deprioritized for
//! a while (`node_min_backoff * 2^(failures-1)`, capped at
//! `node_max_backoff`), and any later request may still pick it when
//! nothing healthier is on offer.
//!
//! Which nodes a given request has already tried is tracked by
//! [`NodeSelection`], created per logical request and dropped with it.

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::{
    self, DEFAULT_NODE_MAX_BACKOFF_MS, DEFAULT_NODE_MIN_BACKOFF_MS, FIRST_NODE_ACCOUNT_NUM,
};
use crate::error::{Error, Result};
use crate::id::AccountId;
use crate::network::node::Node;

#[derive(Debug, Clone, Copy)]
struct NodeHealth {
    failures: u32,
    readmit_at: Instant,
}

/// The set of nodes a client may talk to. Never empty.
#[derive(Debug)]
pub struct Network {
    nodes: Vec<Arc<Node>>,
    health: RwLock<HashMap<AccountId, NodeHealth>>,
    cursor: AtomicUsize,
    node_min_backoff: Duration,
    node_max_backoff: Duration,
}

impl Network {
    /// Builds a registry from explicit nodes. Rejects an empty list and
    /// duplicate node account ids.
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(Error::InvalidArgument("network has no nodes".into()));
        }
        let mut seen = HashSet::new();
        for node in &nodes {
            if !seen.insert(node.account_id()) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate node account id {}",
                    node.account_id()
                )));
            }
        }
        Ok(Self::from_nodes(nodes))
    }

    /// Builds a registry from bare `host:port` addresses. Node account ids
    /// are assigned in order starting at `0.0.3`.
    pub fn from_addresses<S: AsRef<str>>(addresses: &[S]) -> Result<Self> {
        let nodes = addresses
            .iter()
            .zip(FIRST_NODE_ACCOUNT_NUM..)
            .map(|(address, num)| Node::new(AccountId::new(0, 0, num), address.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(nodes)
    }

    pub fn mainnet() -> Self {
        Self::from_book(config::MAINNET_NODES)
    }

    pub fn testnet() -> Self {
        Self::from_book(config::TESTNET_NODES)
    }

    pub fn previewnet() -> Self {
        Self::from_book(config::PREVIEWNET_NODES)
    }

    /// `"mainnet"`, `"testnet"` or `"previewnet"`.
    pub fn for_name(name: &str) -> Result<Self> {
        config::address_book(name)
            .map(Self::from_book)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown network name {name:?}")))
    }

    fn from_book(book: &'static [(u64, &'static str)]) -> Self {
        Self::from_nodes(
            book.iter()
                .map(|(num, address)| Node::from_static(*num, address))
                .collect(),
        )
    }

    fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes: nodes.into_iter().map(Arc::new).collect(),
            health: RwLock::new(HashMap::new()),
            cursor: AtomicUsize::new(0),
            node_min_backoff: Duration::from_millis(DEFAULT_NODE_MIN_BACKOFF_MS),
            node_max_backoff: Duration::from_millis(DEFAULT_NODE_MAX_BACKOFF_MS),
        }
    }

    /// Overrides how long failing nodes are deprioritized.
    pub fn with_node_backoff(mut self, min: Duration, max: Duration) -> Self {
        self.set_node_backoff(min, max);
        self
    }

    pub fn set_node_backoff(&mut self, min: Duration, max: Duration) {
        self.node_min_backoff = min;
        self.node_max_backoff = max.max(min);
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn node(&self, account_id: AccountId) -> Option<Arc<Node>> {
        self.nodes
            .iter()
            .find(|node| node.account_id() == account_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; a `Network` can't be built without nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // -- health --------------------------------------------------------------

    /// `false` while a node is serving out its failure backoff.
    pub fn is_healthy(&self, account_id: AccountId) -> bool {
        self.health
            .read()
            .get(&account_id)
            .map_or(true, |h| h.readmit_at <= Instant::now())
    }

    /// Consecutive failures recorded since the node last succeeded.
    pub fn failures(&self, account_id: AccountId) -> u32 {
        self.health.read().get(&account_id).map_or(0, |h| h.failures)
    }

    /// Records a failure. Advisory: the node stays selectable, it just
    /// drops behind healthy nodes until its backoff elapses.
    pub fn mark_unhealthy(&self, account_id: AccountId) {
        let mut health = self.health.write();
        let entry = health.entry(account_id).or_insert(NodeHealth {
            failures: 0,
            readmit_at: Instant::now(),
        });
        entry.failures = entry.failures.saturating_add(1);
        let backoff = self
            .node_min_backoff
            .checked_mul(1u32.checked_shl(entry.failures - 1).unwrap_or(u32::MAX))
            .map_or(self.node_max_backoff, |b| b.min(self.node_max_backoff));
        entry.readmit_at = Instant::now() + backoff;
        warn!(
            node = %account_id,
            failures = entry.failures,
            backoff_ms = backoff.as_millis() as u64,
            "node marked unhealthy"
        );
    }

    /// Clears any failure record after a successful round trip.
    pub fn mark_healthy(&self, account_id: AccountId) {
        if self.health.write().remove(&account_id).is_some() {
            debug!(node = %account_id, "node readmitted");
        }
    }

    // -- selection -----------------------------------------------------------

    /// Picks the next node in round-robin order, skipping over unhealthy
    /// nodes when a healthy one exists.
    pub fn select_node(&self) -> Arc<Node> {
        let start = self.cursor.fetch_add(1, Ordering::Relaxed);
        let n = self.nodes.len();
        (0..n)
            .map(|i| &self.nodes[(start + i) % n])
            .find(|node| self.is_healthy(node.account_id()))
            .unwrap_or(&self.nodes[start % n])
            .clone()
    }

    /// All node ids, rotated so that `first` leads.
    pub fn ordered_from(&self, first: AccountId) -> Vec<AccountId> {
        let start = self
            .nodes
            .iter()
            .position(|node| node.account_id() == first)
            .unwrap_or(0);
        let n = self.nodes.len();
        (0..n)
            .map(|i| self.nodes[(start + i) % n].account_id())
            .collect()
    }

    /// A selection over every node, starting at the round-robin cursor so
    /// concurrent requests spread across the network.
    pub fn selection(&self) -> NodeSelection<'_> {
        let start = self.cursor.fetch_add(1, Ordering::Relaxed);
        let n = self.nodes.len();
        let candidates = (0..n)
            .map(|i| Arc::clone(&self.nodes[(start + i) % n]))
            .collect();
        NodeSelection::new(self, candidates)
    }

    /// A selection restricted to `account_ids`, tried in the given order.
    pub fn selection_for(&self, account_ids: &[AccountId]) -> Result<NodeSelection<'_>> {
        if account_ids.is_empty() {
            return Err(Error::InvalidArgument("no candidate nodes".into()));
        }
        let candidates = account_ids
            .iter()
            .map(|id| {
                self.node(*id).ok_or_else(|| {
                    Error::InvalidArgument(format!("node {id} is not part of this network"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(NodeSelection::new(self, candidates))
    }
}

// ---------------------------------------------------------------------------
// NodeSelection
// ---------------------------------------------------------------------------

/// Per-request node picker.
///
/// Hands out each candidate once, healthy ones first. After every candidate
/// has been tried it wraps around, still avoiding the node that was just
/// used whenever there is another to choose.
#[derive(Debug)]
pub struct NodeSelection<'a> {
    network: &'a Network,
    candidates: Vec<Arc<Node>>,
    tried: HashSet<AccountId>,
    last: Option<AccountId>,
    rounds: u32,
}

impl<'a> NodeSelection<'a> {
    fn new(network: &'a Network, candidates: Vec<Arc<Node>>) -> Self {
        Self {
            network,
            candidates,
            tried: HashSet::new(),
            last: None,
            rounds: 0,
        }
    }

    /// `true` once every candidate has been handed out in the current round.
    pub fn exhausted(&self) -> bool {
        self.candidates
            .iter()
            .all(|node| self.tried.contains(&node.account_id()))
    }

    /// Completed passes over the candidate list.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// The next node to try.
    pub fn next_node(&mut self) -> Arc<Node> {
        if self.exhausted() {
            self.tried.clear();
            self.rounds += 1;
            if self.candidates.len() > 1 {
                if let Some(last) = self.last {
                    self.tried.insert(last);
                }
            }
            debug!(round = self.rounds, "all candidate nodes tried, wrapping around");
        }

        let untried = || {
            self.candidates
                .iter()
                .filter(|node| !self.tried.contains(&node.account_id()))
        };
        let chosen = untried()
            .find(|node| self.network.is_healthy(node.account_id()))
            .or_else(|| untried().next())
            .map(Arc::clone)
            .unwrap_or_else(|| Arc::clone(&self.candidates[0]));

        self.tried.insert(chosen.account_id());
        self.last = Some(chosen.account_id());
        chosen
    }
}
