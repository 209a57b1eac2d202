//! # Transport
//!
//! The seam between the execution engine and the wire. A [`Transport`]
//! performs one request/response round trip with one node and reports
//! either the response bytes or a [`TransportError`]. It does not retry,
//! classify, or decode; the engine does all of that.
//!
//! [`TcpTransport`] is the stock implementation: one cached TCP connection
//! per node, frames prefixed with a big-endian `u32` length. A connection is
//! taken out of the cache for the length of an exchange and only returned
//! after a complete round trip. If the exchange fails, or its future is
//! dropped by a timeout, the connection is dropped with it and the next
//! attempt against that node starts fresh.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::io;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::config::{DEFAULT_CONNECT_TIMEOUT_MS, MAX_FRAME_BYTES};
use crate::id::AccountId;
use crate::network::node::Node;

/// Why a round trip failed below the application layer. Always retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection refused")]
    ConnectionRefused,

    #[error("request timed out")]
    Timeout,

    #[error("connection reset")]
    Reset,

    #[error("i/o error: {0}")]
    Io(String),
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::ConnectionRefused => Self::ConnectionRefused,
            io::ErrorKind::TimedOut => Self::Timeout,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => Self::Reset,
            _ => Self::Io(e.to_string()),
        }
    }
}

/// One request/response exchange with one node.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, node: &Node, request: Bytes) -> Result<Bytes, TransportError>;
}

/// Length-prefixed framing over plain TCP.
#[derive(Debug)]
pub struct TcpTransport {
    connect_timeout: Duration,
    connections: DashMap<AccountId, TcpStream>,
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS))
    }
}

impl TcpTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            connections: DashMap::new(),
        }
    }

    /// Number of nodes with a cached connection.
    pub fn cached_connections(&self) -> usize {
        self.connections.len()
    }

    /// Takes the cached connection for `node` out of the cache, or opens a
    /// new one. Concurrent calls to one node each get their own stream.
    async fn checkout(&self, node: &Node) -> Result<TcpStream, TransportError> {
        if let Some((_, stream)) = self.connections.remove(&node.account_id()) {
            return Ok(stream);
        }
        debug!(node = %node.account_id(), address = node.address(), "opening connection");
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(node.address()))
            .await
            .map_err(|_| TransportError::Timeout)??;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    async fn exchange(stream: &mut TcpStream, request: &[u8]) -> Result<Bytes, TransportError> {
        write_frame(stream, request).await?;
        read_frame(stream).await
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn call(&self, node: &Node, request: Bytes) -> Result<Bytes, TransportError> {
        let mut stream = self.checkout(node).await?;
        let result = Self::exchange(&mut stream, &request).await;
        if result.is_ok() {
            self.connections.insert(node.account_id(), stream);
        }
        trace!(node = %node.account_id(), ok = result.is_ok(), "round trip complete");
        result
    }
}

/// Writes one `u32`-length-prefixed frame.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), TransportError>
where
    W: AsyncWriteExt + Unpin,
{
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len as usize <= MAX_FRAME_BYTES)
        .ok_or_else(|| TransportError::Io(format!("frame of {} bytes too large", payload.len())))?;
    writer.write_u32(len).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one `u32`-length-prefixed frame.
pub async fn read_frame<R>(reader: &mut R) -> Result<Bytes, TransportError>
where
    R: AsyncReadExt + Unpin,
{
    let len = reader.read_u32().await? as usize;
    if len > MAX_FRAME_BYTES {
        return Err(TransportError::Io(format!("frame of {len} bytes too large")));
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(Bytes::from(buf))
}
