//! Reading cache
//!
//! `ReadingCache` is owned by the cycle logic and is its only writer. A failed
//! fetch simply skips `update`, so downstream consumers keep seeing the last
//! good reading with its original timestamp instead of a gap or a zero.
//!
//! `SharedReading` is the publication point for a reader outside the cycle
//! (e.g. a status display running at another priority). It copies the whole
//! triple under one critical section, never field by field.

use core::cell::Cell;
use critical_section::Mutex;

use crate::reading::Reading;

/// Most recent successful reading plus a freshness flag
#[derive(Debug, Default)]
pub struct ReadingCache {
    latest: Option<Reading>,
    fresh: bool,
}

impl ReadingCache {
    /// Create an empty cache (no reading until the first successful fetch)
    pub const fn new() -> Self {
        Self {
            latest: None,
            fresh: false,
        }
    }

    /// Overwrite the cached reading and mark it fresh
    pub fn update(&mut self, temperature: f32, humidity: f32, now_ms: u32) {
        self.latest = Some(Reading::new(temperature, humidity, now_ms));
        self.fresh = true;
    }

    /// Most recent reading, `None` before the first update
    pub fn latest(&self) -> Option<Reading> {
        self.latest
    }

    /// Whether the reading was updated since the last `mark_stale`
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Clear the freshness flag at the start of a cycle
    ///
    /// The cached reading itself is kept.
    pub fn mark_stale(&mut self) {
        self.fresh = false;
    }
}

/// Reading published for one concurrent external reader
pub struct SharedReading {
    slot: Mutex<Cell<Option<Reading>>>,
}

impl SharedReading {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(None)),
        }
    }

    /// Replace the published reading
    pub fn publish(&self, reading: Reading) {
        critical_section::with(|cs| self.slot.borrow(cs).set(Some(reading)));
    }

    /// Copy the published reading out
    pub fn load(&self) -> Option<Reading> {
        critical_section::with(|cs| self.slot.borrow(cs).get())
    }
}

impl Default for SharedReading {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_before_first_update() {
        let cache = ReadingCache::new();
        assert_eq!(cache.latest(), None);
        assert!(!cache.is_fresh());
    }

    #[test]
    fn test_update_sets_reading_and_freshness() {
        let mut cache = ReadingCache::new();
        cache.update(22.5, 47.125, 1000);
        assert_eq!(cache.latest(), Some(Reading::new(22.5, 47.125, 1000)));
        assert!(cache.is_fresh());
    }

    #[test]
    fn test_latest_is_idempotent_between_updates() {
        let mut cache = ReadingCache::new();
        cache.update(f32::NAN, 12.0, 7);
        let first = cache.latest().unwrap();
        for _ in 0..3 {
            let again = cache.latest().unwrap();
            // Compare bit patterns so NaN counts as identical
            assert_eq!(first.temperature.to_bits(), again.temperature.to_bits());
            assert_eq!(first.humidity.to_bits(), again.humidity.to_bits());
            assert_eq!(first.timestamp, again.timestamp);
        }
    }

    #[test]
    fn test_mark_stale_clears_flag_only() {
        let mut cache = ReadingCache::new();
        cache.update(20.0, 50.0, 500);
        cache.mark_stale();
        assert!(!cache.is_fresh());
        assert_eq!(cache.latest(), Some(Reading::new(20.0, 50.0, 500)));
        cache.update(21.0, 49.0, 1500);
        assert!(cache.is_fresh());
    }

    #[test]
    fn test_skipped_update_keeps_previous_reading() {
        let mut cache = ReadingCache::new();
        let outcomes = [Some((20.0, 50.0)), None, None, Some((21.0, 49.0)), None];
        let mut now = 0;
        for outcome in outcomes {
            now += 1000;
            let before = cache.latest();
            match outcome {
                Some((t, h)) => cache.update(t, h, now),
                None => assert_eq!(cache.latest(), before),
            }
        }
        assert_eq!(cache.latest(), Some(Reading::new(21.0, 49.0, 4000)));
    }

    #[test]
    fn test_shared_reading_round_trip() {
        let shared = SharedReading::new();
        assert_eq!(shared.load(), None);
        shared.publish(Reading::new(19.5, 55.0, 42));
        assert_eq!(shared.load(), Some(Reading::new(19.5, 55.0, 42)));
    }

    #[test]
    fn test_shared_reading_is_never_torn() {
        use std::sync::Arc;
        use std::thread;

        let shared = Arc::new(SharedReading::new());
        let writer = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for i in 0..2000u32 {
                    let v = i as f32;
                    shared.publish(Reading::new(v, v, i));
                }
            })
        };
        for _ in 0..2000 {
            if let Some(r) = shared.load() {
                assert_eq!(r.temperature, r.timestamp as f32);
                assert_eq!(r.humidity, r.timestamp as f32);
            }
        }
        writer.join().unwrap();
    }
}
