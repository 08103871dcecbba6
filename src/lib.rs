//! btserial: single-connection Bluetooth serial link manager
//!
//! Manages one logical serial connection to a remote peer over an RFCOMM
//! byte stream: connect/disconnect lifecycle, buffered reception that
//! decouples arrival timing from consumption, and immediate transmission.
//! Background workers perform the blocking transport I/O; the caller's
//! control context never blocks and observes the link only through returned
//! results and the ordered [`LinkEvent`] channel.
//!
//! The manager is generic over [`TransportConnector`], so anything that
//! yields an async byte stream can stand in for the radio; production code
//! composes it with [`RfcommConnector`]:
//!
//! ```no_run
//! use btserial::{BtAdapter, ConnectionConfig, ConnectionManager, RfcommConfig, RfcommConnector};
//!
//! # async fn run() -> Result<(), btserial::LinkError> {
//! let adapter = BtAdapter::new().await?;
//! let connector = RfcommConnector::new(adapter, RfcommConfig::default());
//! let mut link = ConnectionManager::new(connector, ConnectionConfig::default());
//!
//! let name = link.connect("AA:BB:CC:DD:EE:FF").await?;
//! link.send(b"ping").await?;
//! while let Some(event) = link.recv().await {
//!     println!("{event:?} from {name}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod connection;
pub mod device;
pub mod error;
pub mod transport;

pub use buffer::ReceiveBuffer;
pub use connection::{ConnectionConfig, ConnectionManager, ConnectionState, LinkEvent};
pub use device::RemoteDevice;
pub use error::LinkError;
pub use transport::{
    BtAdapter, RfcommConfig, RfcommConnector, TransportConnector, TransportStream,
    DEFAULT_RFCOMM_CHANNEL,
};
