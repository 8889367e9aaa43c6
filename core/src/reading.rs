//! Reading domain entity

use relay_hal::RawSample;

/// One complete temperature/humidity measurement
///
/// All three fields come from the same successful fetch cycle. The timestamp
/// is uptime in milliseconds and wraps after about 49.7 days; compare it with
/// `age_ms`, never with plain subtraction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Temperature in degrees Celsius
    pub temperature: f32,
    /// Relative humidity in percent (0-100)
    pub humidity: f32,
    /// Uptime in milliseconds when the reading was acquired
    pub timestamp: u32,
}

impl Reading {
    pub const fn new(temperature: f32, humidity: f32, timestamp: u32) -> Self {
        Self {
            temperature,
            humidity,
            timestamp,
        }
    }

    /// Narrow a backend sample to wire precision and stamp it
    pub fn from_sample(sample: RawSample, now_ms: u32) -> Self {
        Self::new(sample.temperature as f32, sample.humidity as f32, now_ms)
    }

    /// Milliseconds elapsed since acquisition, across counter wrap
    pub fn age_ms(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.timestamp)
    }

    /// Whether the reading is older than `max_age_ms`
    pub fn is_stale(&self, now_ms: u32, max_age_ms: u32) -> bool {
        self.age_ms(now_ms) > max_age_ms
    }
}
