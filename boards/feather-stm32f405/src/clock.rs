//! Uptime clock backed by the embassy time driver

use embassy_time::Instant;
use relay_hal::UptimeClock;

/// Milliseconds since boot, truncated to 32 bits
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl UptimeClock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation wraps after ~49.7 days
        Instant::now().as_millis() as u32
    }
}
