//! Relay startup configuration

use core::net::Ipv4Addr;
use core::str::FromStr;

use crate::error::ConfigError;

/// Startup configuration for the relay
///
/// Fixed at boot; nothing here changes while the scheduler runs.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Collector IPv4 address in dotted-quad form
    pub destination: &'static str,
    /// Collector UDP port
    pub port: u16,
    /// Sampling period in milliseconds
    pub period_ms: u32,
    /// Delay before the first timer tick in milliseconds
    pub first_tick_delay_ms: u32,
    /// Time granted to the network stack before sampling starts
    pub network_settle_ms: u32,
    /// Age after which the cached reading is reported as stale
    pub stale_after_ms: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            destination: "192.168.1.37",
            port: 8888,
            period_ms: 1000,
            first_tick_delay_ms: 1000,
            network_settle_ms: 3000,
            stale_after_ms: 3000,
        }
    }
}

impl RelayConfig {
    /// Build a configuration from optional string overrides
    ///
    /// Boards feed this from `option_env!` so the collector can be chosen at
    /// build time. Missing values keep their defaults; the staleness threshold
    /// follows the period.
    pub fn from_overrides(
        destination: Option<&'static str>,
        port: Option<&str>,
        period_ms: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(destination) = destination {
            config.destination = destination;
        }
        if let Some(port) = port {
            config.port = port.parse().map_err(|_| ConfigError::InvalidPort)?;
        }
        if let Some(period_ms) = period_ms {
            config.period_ms = period_ms.parse().map_err(|_| ConfigError::InvalidPeriod)?;
            config.stale_after_ms = config.period_ms.saturating_mul(3);
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse the collector endpoint
    pub fn endpoint(&self) -> Result<(Ipv4Addr, u16), ConfigError> {
        let address =
            Ipv4Addr::from_str(self.destination).map_err(|_| ConfigError::InvalidAddress)?;
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok((address, self.port))
    }

    /// Check every field that the schedulers and transport rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint()?;
        if self.period_ms == 0 {
            return Err(ConfigError::InvalidPeriod);
        }
        Ok(())
    }
}
