//! Interrupt-deferred scheduler
//!
//! The timer interrupt holds a `TickSource` and does nothing but post to the
//! slot. The worker task owns the `Pipeline` (sensor, cache, transport) and a
//! `DeferredWorker`; bus and network I/O only ever run there.

use relay_hal::{SensorBackend, Transport, UptimeClock};

use crate::handoff::{Post, Tick, TickSlot};
use crate::pipeline::{CycleOutcome, Pipeline};

/// Producer handle for the timer interrupt
///
/// `fire` takes a short critical section and never blocks or allocates.
#[derive(Clone, Copy)]
pub struct TickSource<'a> {
    slot: &'a TickSlot,
}

impl<'a> TickSource<'a> {
    pub const fn new(slot: &'a TickSlot) -> Self {
        Self { slot }
    }

    /// Signal one timer tick
    pub fn fire(&self) -> Post {
        self.slot.post()
    }
}

/// Consumer handle for the deferred-work task
pub struct DeferredWorker<'a> {
    slot: &'a TickSlot,
    last_sequence: u32,
}

impl<'a> DeferredWorker<'a> {
    pub const fn new(slot: &'a TickSlot) -> Self {
        Self {
            slot,
            last_sequence: 0,
        }
    }

    /// Run forever, one cycle per pending tick
    pub async fn run<S, T, C>(&mut self, pipeline: &mut Pipeline<S, T, C>) -> !
    where
        S: SensorBackend,
        T: Transport,
        C: UptimeClock,
    {
        info!("Deferred worker started");
        loop {
            self.process_next(pipeline).await;
        }
    }

    /// Wait for the next tick and run one cycle for it
    pub async fn process_next<S, T, C>(
        &mut self,
        pipeline: &mut Pipeline<S, T, C>,
    ) -> (Tick, CycleOutcome)
    where
        S: SensorBackend,
        T: Transport,
        C: UptimeClock,
    {
        let tick = self.slot.wait().await;
        let outcome = self.handle(tick, pipeline).await;
        (tick, outcome)
    }

    /// Run one cycle if a tick is pending, without waiting
    pub async fn process_pending<S, T, C>(
        &mut self,
        pipeline: &mut Pipeline<S, T, C>,
    ) -> Option<(Tick, CycleOutcome)>
    where
        S: SensorBackend,
        T: Transport,
        C: UptimeClock,
    {
        let tick = self.slot.try_take()?;
        let outcome = self.handle(tick, pipeline).await;
        Some((tick, outcome))
    }

    async fn handle<S, T, C>(
        &mut self,
        tick: Tick,
        pipeline: &mut Pipeline<S, T, C>,
    ) -> CycleOutcome
    where
        S: SensorBackend,
        T: Transport,
        C: UptimeClock,
    {
        let skipped = self.skipped_before(tick);
        if skipped > 0 {
            debug!("{} timer ticks coalesced before tick {}", skipped, tick.sequence);
        }
        self.last_sequence = tick.sequence;
        pipeline.run_cycle().await
    }

    /// Ticks between the previous unit of work and `tick` that got folded away
    fn skipped_before(&self, tick: Tick) -> u32 {
        tick.sequence
            .wrapping_sub(self.last_sequence)
            .saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ManualClock, RecordingTransport, ScriptedSensor};
    use embassy_futures::block_on;
    use relay_hal::{FetchError, RawSample};

    /// Sensor whose measurement overlaps with `ticks` timer interrupts
    struct OverlappingSensor<'a> {
        source: TickSource<'a>,
        ticks: usize,
        fetches: usize,
    }

    impl SensorBackend for OverlappingSensor<'_> {
        async fn fetch(&mut self) -> Result<RawSample, FetchError> {
            for _ in 0..self.ticks {
                self.source.fire();
            }
            self.fetches += 1;
            Ok(RawSample::new(20.0, 50.0))
        }
    }

    #[test]
    fn test_coalesced_ticks_run_one_cycle() {
        let slot = TickSlot::new();
        let source = TickSource::new(&slot);
        let mut worker = DeferredWorker::new(&slot);
        let mut pipeline = Pipeline::new(
            ScriptedSensor::new(&[Ok(RawSample::new(22.5, 47.125))]),
            RecordingTransport::new(),
            ManualClock::new(1000),
        );

        assert_eq!(source.fire(), Post::Queued);
        assert_eq!(source.fire(), Post::Coalesced);
        assert_eq!(source.fire(), Post::Coalesced);

        let (tick, outcome) = block_on(worker.process_pending(&mut pipeline)).unwrap();
        assert_eq!(tick.sequence, 1);
        assert!(outcome.is_success());
        assert!(block_on(worker.process_pending(&mut pipeline)).is_none());
        assert_eq!(pipeline.sensor().calls(), 1);
    }

    #[test]
    fn test_ticks_during_cycle_leave_one_pending() {
        let slot = TickSlot::new();
        let source = TickSource::new(&slot);
        let mut worker = DeferredWorker::new(&slot);
        let mut pipeline = Pipeline::new(
            OverlappingSensor {
                source,
                ticks: 2,
                fetches: 0,
            },
            RecordingTransport::new(),
            ManualClock::new(0),
        );

        source.fire();
        assert!(block_on(worker.process_pending(&mut pipeline)).is_some());
        // Two ticks hit while the first cycle was running: exactly one queued
        assert!(slot.is_pending());
        assert_eq!(slot.coalesced(), 1);

        let (tick, _) = block_on(worker.process_pending(&mut pipeline)).unwrap();
        assert_eq!(tick.sequence, 2);
        assert_eq!(pipeline.sensor().fetches, 2);
        // The second cycle overlapped two more ticks; still only one pending
        assert!(slot.is_pending());
        assert_eq!(slot.coalesced(), 2);
    }

    #[test]
    fn test_skipped_tick_count() {
        let slot = TickSlot::new();
        let mut worker = DeferredWorker::new(&slot);
        assert_eq!(worker.skipped_before(Tick { sequence: 1 }), 0);
        worker.last_sequence = 1;
        assert_eq!(worker.skipped_before(Tick { sequence: 4 }), 2);
        worker.last_sequence = u32::MAX;
        assert_eq!(worker.skipped_before(Tick { sequence: 0 }), 0);
    }

    #[test]
    fn test_process_next_runs_cycle_per_tick() {
        let slot = TickSlot::new();
        let source = TickSource::new(&slot);
        let mut worker = DeferredWorker::new(&slot);
        let mut pipeline = Pipeline::new(
            ScriptedSensor::new(&[Ok(RawSample::new(20.0, 50.0)), Err(FetchError::Bus)]),
            RecordingTransport::new(),
            ManualClock::new(500),
        );

        source.fire();
        let (_, first) = block_on(worker.process_next(&mut pipeline));
        assert!(first.is_success());

        source.fire();
        let (tick, second) = block_on(worker.process_next(&mut pipeline));
        assert_eq!(tick.sequence, 2);
        assert_eq!(second, CycleOutcome::AcquisitionFailed(FetchError::Bus));
        assert_eq!(
            pipeline.latest(),
            Some(crate::reading::Reading::new(20.0, 50.0, 500))
        );
        assert_eq!(pipeline.transport().sent().len(), 1);
    }
}
