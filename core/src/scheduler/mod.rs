//! Cycle schedulers
//!
//! Two alternative ways to drive a `Pipeline` at a fixed period:
//!
//! - **`polling`**: one task runs a cycle, sleeps for the period, repeats.
//!   The period is counted from the start of the sleep, so cycle time adds
//!   drift.
//! - **`deferred`**: a timer interrupt posts to a `TickSlot`; a worker task
//!   waits on the slot and runs the cycle outside the interrupt.
//!
//! A board uses exactly one of them.

pub mod deferred;
pub mod polling;

pub use deferred::{DeferredWorker, TickSource};
pub use polling::PollingScheduler;
