//! Network configuration structures

use defmt::{error, info};
use relay_core::RelayConfig;

use crate::device_id;

/// Network stack configuration
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// MAC address for Ethernet
    pub mac_addr: [u8; 6],
    /// Random seed for network stack
    pub seed: u64,
}

impl NetworkConfig {
    /// Identity derived from the chip's unique ID
    pub fn from_device_id() -> Self {
        Self {
            mac_addr: device_id::mac_address(),
            seed: device_id::stack_seed(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            mac_addr: [0x02, 0x00, 0x00, 0x12, 0x34, 0x56],
            seed: 0x1234_5678_u64,
        }
    }
}

/// Relay settings, overridable at build time
///
/// `RELAY_DESTINATION`, `RELAY_PORT` and `RELAY_PERIOD_MS` are read from the
/// build environment. A rejected override falls back to the defaults as a
/// whole rather than mixing values.
pub fn relay_config() -> RelayConfig {
    match RelayConfig::from_overrides(
        option_env!("RELAY_DESTINATION"),
        option_env!("RELAY_PORT"),
        option_env!("RELAY_PERIOD_MS"),
    ) {
        Ok(config) => {
            info!(
                "Collector {}:{}, period {} ms",
                config.destination, config.port, config.period_ms
            );
            config
        }
        Err(e) => {
            error!("Build-time relay configuration rejected ({}), using defaults", e);
            RelayConfig::default()
        }
    }
}
