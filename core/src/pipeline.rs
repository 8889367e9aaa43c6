//! Fetch cycle: sample → cache → encode → send
//!
//! One `run_cycle` call walks `Idle → Sampling → Encoding → Sending → Idle`.
//! A failing step short-circuits back to `Idle`; nothing is retried and the
//! next cycle starts from a clean state. Send only happens after a successful
//! cache update, so a failed fetch never produces a datagram.

use relay_hal::{FetchError, SendError, SensorBackend, Transport, UptimeClock};

use crate::cache::{ReadingCache, SharedReading};
use crate::reading::Reading;
use crate::wire::WireRecord;

/// Position within a fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleState {
    Idle,
    Sampling,
    Encoding,
    Sending,
}

/// How one fetch cycle ended
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Reading cached and its record handed to the transport
    Sent(Reading),
    /// Backend produced no reading; the cache was left untouched
    AcquisitionFailed(FetchError),
    /// Reading cached but the datagram did not go out
    TransmissionFailed { reading: Reading, error: SendError },
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

/// Running totals across cycles (wrapping)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleStats {
    pub cycles: u32,
    pub sent: u32,
    pub acquisition_failures: u32,
    pub transmission_failures: u32,
}

/// Composition root wiring backend, cache, encoder and transport
pub struct Pipeline<S, T, C> {
    sensor: S,
    transport: T,
    clock: C,
    cache: ReadingCache,
    state: CycleState,
    stats: CycleStats,
    status: Option<&'static SharedReading>,
    stale_after_ms: u32,
}

impl<S, T, C> Pipeline<S, T, C>
where
    S: SensorBackend,
    T: Transport,
    C: UptimeClock,
{
    pub fn new(sensor: S, transport: T, clock: C) -> Self {
        Self {
            sensor,
            transport,
            clock,
            cache: ReadingCache::new(),
            state: CycleState::Idle,
            stats: CycleStats::default(),
            status: None,
            stale_after_ms: u32::MAX,
        }
    }

    /// Also publish every new reading for an external reader
    pub fn with_status(mut self, status: &'static SharedReading) -> Self {
        self.status = Some(status);
        self
    }

    /// Warn when the cached reading gets older than `stale_after_ms`
    pub fn with_stale_after(mut self, stale_after_ms: u32) -> Self {
        self.stale_after_ms = stale_after_ms;
        self
    }

    /// Run one full fetch cycle to completion
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.stats.cycles = self.stats.cycles.wrapping_add(1);
        self.cache.mark_stale();

        self.enter(CycleState::Sampling);
        let sample = match self.sensor.fetch().await {
            Ok(sample) => sample,
            Err(e) => {
                self.stats.acquisition_failures = self.stats.acquisition_failures.wrapping_add(1);
                error!("Sensor reading failed: {:?}", e);
                self.report_staleness();
                self.enter(CycleState::Idle);
                return CycleOutcome::AcquisitionFailed(e);
            }
        };
        let reading = Reading::from_sample(sample, self.clock.now_ms());
        self.cache.update(reading.temperature, reading.humidity, reading.timestamp);
        if let Some(status) = self.status {
            status.publish(reading);
        }
        info!("Sensor readings: {} C, {} %", reading.temperature, reading.humidity);

        self.enter(CycleState::Encoding);
        let record = WireRecord::encode(&reading);

        self.enter(CycleState::Sending);
        let outcome = match self.transport.send(record.as_ref()).await {
            Ok(()) => {
                self.stats.sent = self.stats.sent.wrapping_add(1);
                info!(
                    "UDP transmitted: {} C, {} % [{} ms]",
                    reading.temperature, reading.humidity, reading.timestamp
                );
                CycleOutcome::Sent(reading)
            }
            Err(error) => {
                self.stats.transmission_failures =
                    self.stats.transmission_failures.wrapping_add(1);
                error!("UDP transmission failed: {:?}", error);
                CycleOutcome::TransmissionFailed { reading, error }
            }
        };
        self.enter(CycleState::Idle);
        outcome
    }

    fn enter(&mut self, state: CycleState) {
        trace!("Cycle {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn report_staleness(&self) {
        let Some(previous) = self.cache.latest() else {
            warn!("No reading acquired yet");
            return;
        };
        let now = self.clock.now_ms();
        if previous.is_stale(now, self.stale_after_ms) {
            warn!("Last reading is stale: {} ms old", previous.age_ms(now));
        } else {
            debug!("Keeping last reading ({} ms old)", previous.age_ms(now));
        }
    }

    /// Most recent successful reading
    pub fn latest(&self) -> Option<Reading> {
        self.cache.latest()
    }

    pub fn cache(&self) -> &ReadingCache {
        &self.cache
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
