//! Wire record encoding
//!
//! The collector reconstructs a reading from raw byte offsets, so the layout
//! is written out explicitly instead of relying on struct layout:
//!
//! | Offset | Size | Field       | Encoding               |
//! |--------|------|-------------|------------------------|
//! | 0      | 4    | temperature | f32, native byte order |
//! | 4      | 4    | humidity    | f32, native byte order |
//! | 8      | 4    | timestamp   | u32, native byte order |
//!
//! No network-order conversion happens; sender and collector agree on
//! endianness out of band.

use crate::error::WireError;
use crate::reading::Reading;

/// Encoded record length in bytes
pub const WIRE_RECORD_LEN: usize = 12;

const TEMPERATURE: core::ops::Range<usize> = 0..4;
const HUMIDITY: core::ops::Range<usize> = 4..8;
const TIMESTAMP: core::ops::Range<usize> = 8..12;

/// Transmission form of one `Reading`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WireRecord([u8; WIRE_RECORD_LEN]);

impl WireRecord {
    /// Serialize a reading. Total: every `f32` bit pattern encodes.
    pub fn encode(reading: &Reading) -> Self {
        let mut bytes = [0u8; WIRE_RECORD_LEN];
        bytes[TEMPERATURE].copy_from_slice(&reading.temperature.to_ne_bytes());
        bytes[HUMIDITY].copy_from_slice(&reading.humidity.to_ne_bytes());
        bytes[TIMESTAMP].copy_from_slice(&reading.timestamp.to_ne_bytes());
        Self(bytes)
    }

    /// Reconstruct a reading the way the collector does
    pub fn decode(bytes: &[u8]) -> Result<Reading, WireError> {
        let bytes: &[u8; WIRE_RECORD_LEN] = bytes
            .try_into()
            .map_err(|_| WireError::Length {
                actual: bytes.len(),
            })?;
        Ok(Reading::new(
            f32::from_ne_bytes(word(bytes, TEMPERATURE)),
            f32::from_ne_bytes(word(bytes, HUMIDITY)),
            u32::from_ne_bytes(word(bytes, TIMESTAMP)),
        ))
    }

    pub fn as_bytes(&self) -> &[u8; WIRE_RECORD_LEN] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; WIRE_RECORD_LEN] {
        self.0
    }
}

impl AsRef<[u8]> for WireRecord {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn word(bytes: &[u8; WIRE_RECORD_LEN], range: core::ops::Range<usize>) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&bytes[range]);
    out
}
