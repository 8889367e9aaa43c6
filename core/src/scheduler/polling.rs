//! Cooperative polling scheduler

use embedded_hal_async::delay::DelayNs;
use relay_hal::{SensorBackend, Transport, UptimeClock};

use crate::pipeline::{CycleOutcome, Pipeline};

/// Runs a cycle, then sleeps `period_ms`, forever
#[derive(Debug, Clone, Copy)]
pub struct PollingScheduler {
    period_ms: u32,
}

impl PollingScheduler {
    pub const fn new(period_ms: u32) -> Self {
        Self { period_ms }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Drive the pipeline indefinitely; per-cycle failures never stop it
    pub async fn run<S, T, C, D>(&self, pipeline: &mut Pipeline<S, T, C>, delay: &mut D) -> !
    where
        S: SensorBackend,
        T: Transport,
        C: UptimeClock,
        D: DelayNs,
    {
        info!("Polling scheduler started ({} ms period)", self.period_ms);
        loop {
            self.step(pipeline, delay).await;
        }
    }

    /// Drive exactly `cycles` cycles and return their outcomes in order
    pub async fn run_cycles<S, T, C, D, const N: usize>(
        &self,
        pipeline: &mut Pipeline<S, T, C>,
        delay: &mut D,
    ) -> heapless::Vec<CycleOutcome, N>
    where
        S: SensorBackend,
        T: Transport,
        C: UptimeClock,
        D: DelayNs,
    {
        let mut outcomes = heapless::Vec::new();
        for _ in 0..N {
            let outcome = self.step(pipeline, delay).await;
            // Capacity is N and we push N times
            let _ = outcomes.push(outcome);
        }
        outcomes
    }

    async fn step<S, T, C, D>(
        &self,
        pipeline: &mut Pipeline<S, T, C>,
        delay: &mut D,
    ) -> CycleOutcome
    where
        S: SensorBackend,
        T: Transport,
        C: UptimeClock,
        D: DelayNs,
    {
        let outcome = pipeline.run_cycle().await;
        delay.delay_ms(self.period_ms).await;
        outcome
    }
}
