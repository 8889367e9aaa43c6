//! Capabilities that may have failed to initialize
//!
//! A backend or transport that could not be constructed is not retried.
//! Wrapping it in `Capability::Failed` keeps the pipeline running: every later
//! cycle fails that step immediately, without touching the hardware.

use relay_hal::{FetchError, RawSample, SendError, SensorBackend, Transport};

use crate::error::InitError;

/// A capability that is either usable or permanently failed
#[derive(Debug)]
pub enum Capability<T> {
    Ready(T),
    Failed(InitError),
}

impl<T> Capability<T> {
    /// Wrap a constructor result, logging a failure once
    pub fn from_init(name: &'static str, result: Result<T, InitError>) -> Self {
        match result {
            Ok(inner) => {
                info!("{} initialized", name);
                Self::Ready(inner)
            }
            Err(e) => {
                error!("{} initialization failed: {:?}", name, e);
                Self::Failed(e)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The initialization error, if any
    pub fn failure(&self) -> Option<InitError> {
        match self {
            Self::Ready(_) => None,
            Self::Failed(e) => Some(*e),
        }
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(inner) => Some(inner),
            Self::Failed(_) => None,
        }
    }
}

impl<S: SensorBackend> SensorBackend for Capability<S> {
    async fn fetch(&mut self) -> Result<RawSample, FetchError> {
        match self {
            Self::Ready(sensor) => sensor.fetch().await,
            Self::Failed(_) => Err(FetchError::NotReady),
        }
    }
}

impl<T: Transport> Transport for Capability<T> {
    async fn send(&mut self, datagram: &[u8]) -> Result<(), SendError> {
        match self {
            Self::Ready(transport) => transport.send(datagram).await,
            Self::Failed(_) => Err(SendError::Unavailable),
        }
    }
}
