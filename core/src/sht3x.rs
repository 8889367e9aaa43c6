//! Sensirion SHT3x temperature/humidity sensor backend
//!
//! Single-shot measurements with high repeatability and clock stretching
//! disabled. Each 16-bit word from the sensor carries a CRC-8 that is checked
//! before conversion; a bad checksum fails the whole fetch.

use embedded_hal::i2c::ErrorKind;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{Error as _, I2c};
use relay_hal::{FetchError, RawSample, SensorBackend};

use crate::error::InitError;

/// I2C address with ADDR pin low
pub const DEFAULT_ADDRESS: u8 = 0x44;
/// I2C address with ADDR pin high
pub const ALTERNATE_ADDRESS: u8 = 0x45;

const CMD_MEASURE_HIGH_REPEATABILITY: [u8; 2] = [0x24, 0x00];
const CMD_READ_STATUS: [u8; 2] = [0xF3, 0x2D];

/// Worst-case high-repeatability measurement duration is 15.5 ms
const MEASUREMENT_TIME_MS: u32 = 16;

const CRC8_POLYNOMIAL: u8 = 0x31;
const CRC8_INIT: u8 = 0xFF;

/// SHT3x driver over an async I2C bus
pub struct Sht3x<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Sht3x<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    /// Check that the sensor answers on the bus
    ///
    /// Reads the status register. Used once at startup; a failure leaves the
    /// backend unusable for the rest of the run.
    pub async fn probe(&mut self) -> Result<u16, InitError> {
        let mut status = [0u8; 3];
        self.i2c
            .write_read(self.address, &CMD_READ_STATUS, &mut status)
            .await
            .map_err(|_| InitError::SensorNotReady)?;
        checked_word(&status).map_err(|_| InitError::SensorNotReady)
    }

    /// Trigger one measurement and convert both channels
    pub async fn measure(&mut self) -> Result<RawSample, FetchError> {
        self.i2c
            .write(self.address, &CMD_MEASURE_HIGH_REPEATABILITY)
            .await
            .map_err(|e| bus_error(e.kind()))?;

        self.delay.delay_ms(MEASUREMENT_TIME_MS).await;

        let mut frame = [0u8; 6];
        self.i2c
            .read(self.address, &mut frame)
            .await
            .map_err(|e| bus_error(e.kind()))?;

        let raw_temperature = checked_word(&frame[0..3])?;
        let raw_humidity = checked_word(&frame[3..6])?;
        Ok(RawSample::new(
            temperature_celsius(raw_temperature),
            relative_humidity(raw_humidity),
        ))
    }

    /// Release the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C: I2c, D: DelayNs> SensorBackend for Sht3x<I2C, D> {
    async fn fetch(&mut self) -> Result<RawSample, FetchError> {
        self.measure().await
    }
}

fn bus_error(kind: ErrorKind) -> FetchError {
    match kind {
        // No measurement in progress or device absent
        ErrorKind::NoAcknowledge(_) => FetchError::NotReady,
        _ => FetchError::Bus,
    }
}

/// Validate a `[msb, lsb, crc]` triple and return the word
fn checked_word(bytes: &[u8]) -> Result<u16, FetchError> {
    match bytes {
        [msb, lsb, crc] if crc8(&[*msb, *lsb]) == *crc => Ok(u16::from_be_bytes([*msb, *lsb])),
        _ => Err(FetchError::Channel),
    }
}

/// CRC-8, polynomial 0x31, init 0xFF, no reflection
fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC8_INIT;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC8_POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }
    crc
}

fn temperature_celsius(raw: u16) -> f64 {
    -45.0 + 175.0 * f64::from(raw) / 65535.0
}

fn relative_humidity(raw: u16) -> f64 {
    100.0 * f64::from(raw) / 65535.0
}
