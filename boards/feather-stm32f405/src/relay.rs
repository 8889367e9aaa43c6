//! Pipeline assembly and scheduler selection
//!
//! The timer handoff is the default. Building with `--features poll-loop`
//! swaps in the sleep-loop scheduler; the pipeline is the same either way.

use relay_core::{Pipeline, RelayConfig, SharedReading};
use relay_hal::{SensorBackend, Transport};

use crate::clock::EmbassyClock;

/// One-slot handoff from the tick task to the worker
#[cfg(not(feature = "poll-loop"))]
pub static TICKS: relay_core::TickSlot = relay_core::TickSlot::new();

/// Latest reading, read by the status task
pub static STATUS: SharedReading = SharedReading::new();

/// Run the relay forever with whatever capabilities came up
pub async fn run<S, T>(sensor: S, transport: T, config: &RelayConfig) -> !
where
    S: SensorBackend,
    T: Transport,
{
    let mut pipeline = Pipeline::new(sensor, transport, EmbassyClock)
        .with_status(&STATUS)
        .with_stale_after(config.stale_after_ms);
    drive(&mut pipeline, config).await
}

#[cfg(not(feature = "poll-loop"))]
async fn drive<S, T>(pipeline: &mut Pipeline<S, T, EmbassyClock>, _config: &RelayConfig) -> !
where
    S: SensorBackend,
    T: Transport,
{
    relay_core::DeferredWorker::new(&TICKS).run(pipeline).await
}

#[cfg(feature = "poll-loop")]
async fn drive<S, T>(pipeline: &mut Pipeline<S, T, EmbassyClock>, config: &RelayConfig) -> !
where
    S: SensorBackend,
    T: Transport,
{
    relay_core::PollingScheduler::new(config.period_ms)
        .run(pipeline, &mut embassy_time::Delay)
        .await
}
