//! RFCOMM transport implementation for Bluetooth serial connections

use async_trait::async_trait;
use bluer::rfcomm::{SocketAddr as RfcommAddr, Stream as RfcommStream};
use bluer::Address;
use tracing::{debug, info};

use crate::device::RemoteDevice;
use crate::error::LinkError;
use crate::transport::adapter::BtAdapter;
use crate::transport::traits::TransportConnector;

/// Default RFCOMM channel for serial port profile peers
pub const DEFAULT_RFCOMM_CHANNEL: u8 = 1;

/// Configuration for the RFCOMM connector
#[derive(Debug, Clone)]
pub struct RfcommConfig {
    /// RFCOMM channel number
    pub channel: u8,
}

impl Default for RfcommConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_RFCOMM_CHANNEL,
        }
    }
}

/// Connector opening RFCOMM streams to paired peers.
pub struct RfcommConnector {
    adapter: BtAdapter,
    config: RfcommConfig,
}

impl RfcommConnector {
    pub fn new(adapter: BtAdapter, config: RfcommConfig) -> Self {
        Self { adapter, config }
    }

    /// Access the underlying adapter glue (radio state, device listing).
    pub fn adapter(&self) -> &BtAdapter {
        &self.adapter
    }
}

#[async_trait]
impl TransportConnector for RfcommConnector {
    type Stream = RfcommStream;

    async fn resolve(&self, address: &str) -> Result<RemoteDevice, LinkError> {
        self.adapter.resolve(address).await
    }

    async fn open(&self, device: &RemoteDevice, secure: bool) -> Result<Self::Stream, LinkError> {
        let addr: Address = device
            .address
            .parse()
            .map_err(|_| LinkError::UnknownDevice(device.address.clone()))?;
        let socket_addr = RfcommAddr::new(addr, self.config.channel);

        // Link-level security is adapter policy under BlueZ; the flag is
        // recorded with the attempt.
        info!(
            "[BT] Connecting to {} channel {} (secure={})",
            addr, self.config.channel, secure
        );

        let stream = RfcommStream::connect(socket_addr)
            .await
            .map_err(|e| LinkError::TransportFailure(format!("RFCOMM connect failed: {e}")))?;

        debug!("[BT] Connected to {}", addr);
        Ok(stream)
    }

    fn name(&self) -> &'static str {
        "Bluetooth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RfcommConfig::default();
        assert_eq!(config.channel, DEFAULT_RFCOMM_CHANNEL);
    }
}
