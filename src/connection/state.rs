//! Connection lifecycle states
//!
//! Exactly one instance is live per manager, owned by the manager's link
//! record; workers and callers observe it only through emitted events and
//! the `state()` accessor.

use crate::device::RemoteDevice;

/// Lifecycle state of the single logical connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and none in flight
    Disconnected,
    /// Handshake in progress; the socket is not yet usable for I/O
    Connecting(RemoteDevice),
    /// Active episode; `send` is valid
    Connected(RemoteDevice),
    /// The stream terminated without a caller-initiated disconnect.
    /// Transient notification state: `connect`, `send` and `disconnect`
    /// treat it exactly like `Disconnected`.
    Lost(RemoteDevice),
}

impl ConnectionState {
    /// Whether a new connection attempt may start from this state.
    pub fn can_connect(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Lost(_))
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    /// The peer of the current or just-lost episode, if any.
    pub fn device(&self) -> Option<&RemoteDevice> {
        match self {
            Self::Disconnected => None,
            Self::Connecting(d) | Self::Connected(d) | Self::Lost(d) => Some(d),
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting(d) => write!(f, "connecting to {d}"),
            Self::Connected(d) => write!(f, "connected to {d}"),
            Self::Lost(d) => write!(f, "lost connection to {d}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> RemoteDevice {
        RemoteDevice {
            address: "AA:BB:CC:DD:EE:FF".into(),
            name: "peer".into(),
        }
    }

    #[test]
    fn test_connect_allowed_states() {
        assert!(ConnectionState::Disconnected.can_connect());
        assert!(ConnectionState::Lost(device()).can_connect());
        assert!(!ConnectionState::Connecting(device()).can_connect());
        assert!(!ConnectionState::Connected(device()).can_connect());
    }

    #[test]
    fn test_only_connected_is_connected() {
        assert!(ConnectionState::Connected(device()).is_connected());
        assert!(!ConnectionState::Lost(device()).is_connected());
        assert!(!ConnectionState::Disconnected.is_connected());
    }
}
