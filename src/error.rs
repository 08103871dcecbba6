//! Error taxonomy for the serial link

use thiserror::Error;

/// Errors surfaced by the adapter glue and the connection manager.
///
/// Every public operation returns one of these rather than panicking;
/// background worker failures are converted into connect resolutions or
/// `ConnectionLost` events instead of propagating.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The BlueZ session or default adapter could not be reached
    #[error("bluetooth adapter unavailable: {0}")]
    AdapterUnavailable(String),

    /// The address does not parse or does not name a paired device
    #[error("unknown device: {0}")]
    UnknownDevice(String),

    /// A connection attempt is already outstanding
    #[error("connection attempt already in progress")]
    AlreadyConnecting,

    /// A connection is already established; disconnect first
    #[error("already connected")]
    AlreadyConnected,

    /// The operation needs an active connection
    #[error("not connected")]
    NotConnected,

    /// Handshake or stream I/O failure, opaque cause
    #[error("transport failure: {0}")]
    TransportFailure(String),

    /// Buffered bytes are not valid UTF-8
    #[error("received bytes are not valid UTF-8")]
    EncodingFailure,
}
