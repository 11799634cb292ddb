//! Transparent byte bridge between the USB and UART transports.

pub mod relay;
pub mod transport;

pub use relay::{Bridge, BridgeConfig, BridgeStats, StopFlag};
pub use transport::{Transport, TransportError};
