//! One-shot TCP exchange with a DRS unit.
//!
//! Every command opens its own connection, writes one frame, waits for one read
//! and drops the socket. Nothing is pooled or reused between commands.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

pub const DRS_PORT: u16 = 65050;
pub const DEFAULT_READ_BUFFER: usize = 1024;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no response from {address} within {timeout:?}")]
    Timeout { address: String, timeout: Duration },
    #[error("connection to {address} failed: {source}")]
    Connection {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error talking to {address}: {source}")]
    Io {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }
}

/// Request/response exchange with a device.
///
/// `Ok` with an empty vector means the peer closed without answering.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, address: &str, frame: &[u8], timeout: Duration) -> Result<Vec<u8>, TransportError>;
}

#[derive(Debug, Clone)]
pub struct TcpTransport {
    port: u16,
    read_buffer_size: usize,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self {
            port: DRS_PORT,
            read_buffer_size: DEFAULT_READ_BUFFER,
        }
    }

    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Self::new()
        }
    }

    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host` alone gets the configured port; `host:port` is used as given.
    pub fn endpoint(&self, address: &str) -> String {
        if address.contains(':') {
            address.to_string()
        } else {
            format!("{}:{}", address, self.port)
        }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&self, address: &str, frame: &[u8], timeout: Duration) -> Result<Vec<u8>, TransportError> {
        let endpoint = self.endpoint(address);
        let timed_out = || TransportError::Timeout {
            address: endpoint.clone(),
            timeout,
        };

        debug!(endpoint = %endpoint, bytes = frame.len(), "Connecting");
        let mut stream = tokio::time::timeout(timeout, TcpStream::connect(&endpoint))
            .await
            .map_err(|_| timed_out())?
            .map_err(|source| TransportError::Connection {
                address: endpoint.clone(),
                source,
            })?;

        if let Err(e) = stream.set_nodelay(true) {
            warn!(endpoint = %endpoint, error = %e, "Failed to set TCP_NODELAY");
        }

        let io_error = |source| TransportError::Io {
            address: endpoint.clone(),
            source,
        };
        stream.write_all(frame).await.map_err(io_error)?;
        stream.flush().await.map_err(io_error)?;

        let mut buffer = vec![0u8; self.read_buffer_size];
        let n = tokio::time::timeout(timeout, stream.read(&mut buffer))
            .await
            .map_err(|_| timed_out())?
            .map_err(io_error)?;

        buffer.truncate(n);
        debug!(endpoint = %endpoint, bytes = n, "Received response");
        Ok(buffer)
    }
}
