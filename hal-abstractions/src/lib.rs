//! Hardware abstraction traits for the climate relay
//!
//! This crate defines the capabilities the relay pipeline consumes without
//! knowing which board provides them. BSPs implement these traits.
//!
//! - **`sensor`**: `SensorBackend`, one blocking-until-done measurement
//! - **`transport`**: `Transport`, one datagram per call, all-or-nothing
//! - **`clock`**: `UptimeClock`, milliseconds since start (wrapping)

#![no_std]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod clock;
pub mod sensor;
pub mod transport;

pub use clock::UptimeClock;
pub use sensor::{FetchError, RawSample, SensorBackend};
pub use transport::{ensure_complete, SendError, Transport};
