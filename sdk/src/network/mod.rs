//! # Network Module
//!
//! Everything the client knows about the ledger's nodes, and the seam it
//! talks to them through.
//!
//! ## Architecture
//!
//! ```text
//! node.rs       One endpoint: node account id + host:port address
//! registry.rs   The node set, advisory health, per-request selection
//! transport.rs  Transport trait and the framed TCP implementation
//! ```
//!
//! ## Design Decisions
//!
//! - Node health lives behind a `parking_lot::RwLock` because reads (every
//!   selection) vastly outnumber writes (failures), and health is advisory:
//!   last write wins, nobody waits on anybody.
//! - Selection state ("which nodes has *this* request tried") is owned by a
//!   per-request [`NodeSelection`], never by the registry. Concurrent
//!   requests share only the round-robin cursor, an atomic.
//! - The registry does no I/O. Cached connections belong to the transport.

pub mod node;
pub mod registry;
pub mod transport;

pub use node::Node;
pub use registry::{Network, NodeSelection};
pub use transport::{TcpTransport, Transport, TransportError};
