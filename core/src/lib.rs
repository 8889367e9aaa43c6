//! Platform-agnostic core logic for the climate relay
//!
//! This crate contains the sampling, caching and dispatch pipeline that is
//! shared across boards. It has NO hardware dependencies: the sensor,
//! transport and clock arrive through the `relay-hal` traits.
//!
//! ## Architecture
//!
//! ```text
//!  timer ISR ──post──▶ TickSlot ──wait──▶ DeferredWorker ─┐
//!                                                          ▼
//!  PollingScheduler ────────────────────────────────▶ Pipeline::run_cycle
//!                                                          │
//!      SensorBackend::fetch ─▶ ReadingCache::update ─▶ WireRecord::encode ─▶ Transport::send
//! ```
//!
//! Both schedulers drive the same `Pipeline`; a board picks exactly one.

#![no_std]
#![deny(unsafe_code)]
#![deny(warnings)]

#[cfg(test)]
extern crate std;

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod cache;
pub mod capability;
pub mod config;
pub mod error;
pub mod handoff;
pub mod pipeline;
pub mod reading;
pub mod scheduler;
pub mod sht3x;
pub mod wire;

#[cfg(test)]
mod testutil;

pub use cache::{ReadingCache, SharedReading};
pub use capability::Capability;
pub use config::RelayConfig;
pub use error::{ConfigError, InitError, WireError};
pub use handoff::{Post, Tick, TickSlot};
pub use pipeline::{CycleOutcome, CycleState, CycleStats, Pipeline};
pub use reading::Reading;
pub use scheduler::{DeferredWorker, PollingScheduler, TickSource};
pub use sht3x::Sht3x;
pub use wire::{WireRecord, WIRE_RECORD_LEN};

pub use relay_hal::{FetchError, RawSample, SendError, SensorBackend, Transport, UptimeClock};
