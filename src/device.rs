//! Remote device identity

/// A remote Bluetooth peer, as reported by the platform adapter.
///
/// Immutable value; the connection core never interprets the address beyond
/// handing it back to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDevice {
    /// Peer address, e.g. "AA:BB:CC:DD:EE:FF"
    pub address: String,
    /// Display name (falls back to the address when the peer has none)
    pub name: String,
}

impl std::fmt::Display for RemoteDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}
