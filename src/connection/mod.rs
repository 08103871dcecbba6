//! Connection lifecycle management
//!
//! This module handles:
//! - The single-connection lifecycle state machine
//! - Background connect and I/O workers
//! - The ordered event channel back to the control context

mod manager;
mod state;

pub use manager::{ConnectionConfig, ConnectionManager, LinkEvent};
pub use state::ConnectionState;
