//! Sensor backend capability
//!
//! A backend triggers one hardware measurement per `fetch` and hands back both
//! channels together. Implementors must not report partial success: if either
//! channel cannot be read, the whole call fails.

/// Raw measurement as produced by the device driver
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent (0-100)
    pub humidity: f64,
}

impl RawSample {
    pub const fn new(temperature: f64, humidity: f64) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}

/// Sensor fetch errors
///
/// The pipeline treats every variant the same way ("no reading this cycle");
/// the distinction only exists for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// Device absent, not acknowledging, or never initialized
    NotReady,
    /// Bus transfer failed
    Bus,
    /// A channel could not be read or failed its integrity check
    Channel,
}

impl core::fmt::Display for FetchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotReady => write!(f, "Sensor not ready"),
            Self::Bus => write!(f, "Sensor bus error"),
            Self::Channel => write!(f, "Sensor channel read error"),
        }
    }
}

impl core::error::Error for FetchError {}

/// Capability for acquiring one temperature/humidity measurement
///
/// `fetch` may wait on bus I/O but must eventually complete. The caller
/// imposes no timeout.
///
/// # Example Implementation
///
/// ```ignore
/// struct FixedSensor;
///
/// impl SensorBackend for FixedSensor {
///     async fn fetch(&mut self) -> Result<RawSample, FetchError> {
///         Ok(RawSample::new(21.0, 40.0))
///     }
/// }
/// ```
pub trait SensorBackend {
    /// Trigger a measurement and return both channels
    fn fetch(&mut self) -> impl core::future::Future<Output = Result<RawSample, FetchError>>;
}

impl<T: SensorBackend + ?Sized> SensorBackend for &mut T {
    fn fetch(&mut self) -> impl core::future::Future<Output = Result<RawSample, FetchError>> {
        T::fetch(self)
    }
}
