//! Error types owned by the core
//!
//! Per-cycle failures use the capability errors from `relay-hal`
//! (`FetchError`, `SendError`); this module holds the setup-time errors.

/// Capability construction errors
///
/// Reported once at startup. The affected capability stays unusable for the
/// rest of the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// Sensor did not respond during setup
    SensorNotReady,
    /// Destination address or port could not be parsed
    InvalidDestination,
    /// Datagram socket could not be created or bound
    SocketUnavailable,
}

impl core::fmt::Display for InitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SensorNotReady => write!(f, "Sensor not ready"),
            Self::InvalidDestination => write!(f, "Invalid destination"),
            Self::SocketUnavailable => write!(f, "Socket unavailable"),
        }
    }
}

impl core::error::Error for InitError {}

/// Startup configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Destination is not a dotted-quad IPv4 address
    InvalidAddress,
    /// Destination port is zero or not a number
    InvalidPort,
    /// Sampling period is zero or not a number
    InvalidPeriod,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidAddress => write!(f, "Invalid destination address"),
            Self::InvalidPort => write!(f, "Invalid destination port"),
            Self::InvalidPeriod => write!(f, "Invalid sampling period"),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Wire record decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WireError {
    /// Datagram is not exactly one record long
    Length { actual: usize },
}

impl core::fmt::Display for WireError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Length { actual } => write!(
                f,
                "Unexpected record length {} (expected {})",
                actual,
                crate::wire::WIRE_RECORD_LEN
            ),
        }
    }
}

impl core::error::Error for WireError {}
