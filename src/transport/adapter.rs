//! BlueZ adapter glue: radio state, enable requests, paired devices
//!
//! Thin wrapper over the platform collaborator; none of the connection
//! core's state lives here.

use bluer::{Adapter, Address};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::device::RemoteDevice;
use crate::error::LinkError;

/// Handle to the default Bluetooth adapter.
pub struct BtAdapter {
    adapter: Adapter,
    /// Serializes enable requests so exactly one is outstanding at a time
    enable_gate: Mutex<()>,
}

impl BtAdapter {
    /// Open the BlueZ session and grab the default adapter.
    pub async fn new() -> Result<Self, LinkError> {
        let session = bluer::Session::new()
            .await
            .map_err(|e| LinkError::AdapterUnavailable(e.to_string()))?;
        let adapter = session
            .default_adapter()
            .await
            .map_err(|e| LinkError::AdapterUnavailable(e.to_string()))?;
        debug!("[BT] Using adapter {}", adapter.name());
        Ok(Self {
            adapter,
            enable_gate: Mutex::new(()),
        })
    }

    /// Whether the radio is currently powered.
    pub async fn is_enabled(&self) -> Result<bool, LinkError> {
        self.adapter
            .is_powered()
            .await
            .map_err(|e| LinkError::AdapterUnavailable(e.to_string()))
    }

    /// Request that the radio be powered on, reporting whether it ended up
    /// enabled. Requests are serialized; a second caller waits for the first
    /// to finish rather than racing it.
    pub async fn request_enable(&self) -> Result<bool, LinkError> {
        let _outstanding = self.enable_gate.lock().await;
        if self.is_enabled().await? {
            return Ok(true);
        }
        info!("[BT] Requesting adapter power-on");
        self.adapter
            .set_powered(true)
            .await
            .map_err(|e| LinkError::AdapterUnavailable(e.to_string()))?;
        self.is_enabled().await
    }

    /// List previously-paired devices.
    pub async fn known_devices(&self) -> Result<Vec<RemoteDevice>, LinkError> {
        let addresses = self
            .adapter
            .device_addresses()
            .await
            .map_err(|e| LinkError::AdapterUnavailable(e.to_string()))?;

        let mut devices = Vec::new();
        for addr in addresses {
            let Ok(device) = self.adapter.device(addr) else {
                continue;
            };
            if let Ok(true) = device.is_paired().await {
                devices.push(RemoteDevice {
                    address: addr.to_string(),
                    name: device_name(&device, addr).await,
                });
            }
        }
        Ok(devices)
    }

    /// Resolve an address string to a paired device.
    pub async fn resolve(&self, address: &str) -> Result<RemoteDevice, LinkError> {
        let addr: Address = address
            .parse()
            .map_err(|_| LinkError::UnknownDevice(address.to_string()))?;
        let device = self
            .adapter
            .device(addr)
            .map_err(|_| LinkError::UnknownDevice(address.to_string()))?;
        match device.is_paired().await {
            Ok(true) => Ok(RemoteDevice {
                address: addr.to_string(),
                name: device_name(&device, addr).await,
            }),
            _ => Err(LinkError::UnknownDevice(address.to_string())),
        }
    }
}

async fn device_name(device: &bluer::Device, addr: Address) -> String {
    match device.name().await {
        Ok(Some(name)) => name,
        _ => addr.to_string(),
    }
}
