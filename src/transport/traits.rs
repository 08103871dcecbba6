//! Transport trait abstraction for pluggable stream backends

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::device::RemoteDevice;
use crate::error::LinkError;

/// A bidirectional byte stream usable as the active connection socket.
pub trait TransportStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> TransportStream for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

/// Factory for resolving peer addresses and opening streams to them.
///
/// The manager is generic over this seam; production code uses the RFCOMM
/// connector, tests drive the manager over an in-memory pipe.
#[async_trait]
pub trait TransportConnector: Send + Sync + 'static {
    /// The stream type this connector produces
    type Stream: TransportStream;

    /// Resolve an address to a known remote device.
    ///
    /// Fails with [`LinkError::UnknownDevice`] when the address does not
    /// name a device this transport can reach; must not change any state.
    async fn resolve(&self, address: &str) -> Result<RemoteDevice, LinkError>;

    /// Perform the handshake, returning an open stream.
    ///
    /// The `secure` flag selects an authenticated handshake where the
    /// transport supports the distinction; it carries no logic of its own.
    async fn open(&self, device: &RemoteDevice, secure: bool) -> Result<Self::Stream, LinkError>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}
