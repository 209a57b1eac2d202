//! The [`Client`]: network, transport, operator and retry settings in one
//! cheaply clonable handle.

use std::fmt;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::crypto::PrivateKey;
use crate::error::Result;
use crate::id::AccountId;
use crate::network::{Network, TcpTransport, Transport};

/// The account that pays for transactions by default, and its key.
#[derive(Debug, Clone)]
pub struct Operator {
    pub account_id: AccountId,
    pub private_key: PrivateKey,
}

/// Entry point for executing transactions and queries.
///
/// Everything inside is behind an `Arc`, so cloning a client to hand it to
/// another task is cheap, and all clones share node health.
#[derive(Clone)]
pub struct Client {
    network: Arc<Network>,
    transport: Arc<dyn Transport>,
    operator: Option<Arc<Operator>>,
    config: ClientConfig,
}

impl Client {
    /// A client for `network` that speaks the framed TCP transport.
    pub fn for_network(network: Network) -> Self {
        Self::with_transport(network, Arc::new(TcpTransport::default()))
    }

    pub fn for_mainnet() -> Self {
        Self::for_network(Network::mainnet())
    }

    pub fn for_testnet() -> Self {
        Self::for_network(Network::testnet())
    }

    pub fn for_previewnet() -> Self {
        Self::for_network(Network::previewnet())
    }

    /// `"mainnet"`, `"testnet"` or `"previewnet"`.
    pub fn for_name(name: &str) -> Result<Self> {
        Network::for_name(name).map(Self::for_network)
    }

    /// A client with a caller-supplied transport; tests use this to script
    /// node behavior.
    pub fn with_transport(network: Network, transport: Arc<dyn Transport>) -> Self {
        let config = ClientConfig::default();
        let network = network.with_node_backoff(config.node_min_backoff(), config.node_max_backoff());
        Self {
            network: Arc::new(network),
            transport,
            operator: None,
            config,
        }
    }

    /// Sets the operator that pays for and signs transactions by default.
    pub fn with_operator(mut self, account_id: AccountId, private_key: PrivateKey) -> Self {
        self.set_operator(account_id, private_key);
        self
    }

    pub fn set_operator(&mut self, account_id: AccountId, private_key: PrivateKey) {
        self.operator = Some(Arc::new(Operator {
            account_id,
            private_key,
        }));
    }

    /// Replaces the retry settings after validating them. Node backoff
    /// settings only apply to a network not yet shared with other clones.
    pub fn with_config(mut self, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        if let Some(network) = Arc::get_mut(&mut self.network) {
            network.set_node_backoff(config.node_min_backoff(), config.node_max_backoff());
        }
        self.config = config;
        Ok(self)
    }

    pub fn network(&self) -> &Arc<Network> {
        &self.network
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn operator(&self) -> Option<&Operator> {
        self.operator.as_deref()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("nodes", &self.network.len())
            .field("operator", &self.operator.as_ref().map(|op| op.account_id))
            .field("config", &self.config)
            .finish()
    }
}
