pub mod adapter;
pub mod rfcomm;
pub mod traits;

pub use adapter::BtAdapter;
pub use rfcomm::{RfcommConfig, RfcommConnector, DEFAULT_RFCOMM_CHANNEL};
pub use traits::{TransportConnector, TransportStream};
