//! Network side of the relay
//!
//! - **`config`**: build-time relay settings and per-board network identity
//! - **`manager`**: waits for DHCP within the settle window
//! - **`udp`**: `Transport` implementation over an embassy-net UDP socket

pub mod config;
pub mod manager;
pub mod udp;

pub use config::NetworkConfig;
pub use udp::{UdpBuffers, UdpTransport};
