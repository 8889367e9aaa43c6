//! Uptime clock capability

/// Milliseconds since system start
///
/// The counter is 32 bits wide and wraps after about 49.7 days. Consumers
/// compare values with wrapping arithmetic and never treat them as wall-clock
/// time.
pub trait UptimeClock {
    fn now_ms(&self) -> u32;
}

impl<T: UptimeClock + ?Sized> UptimeClock for &T {
    fn now_ms(&self) -> u32 {
        T::now_ms(self)
    }
}
