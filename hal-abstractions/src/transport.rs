//! Datagram transport capability

/// Datagram send errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError {
    /// Transport was never initialized (socket or destination unusable)
    Unavailable,
    /// Network stack refused the datagram
    Rejected,
    /// Stack accepted fewer bytes than the datagram holds
    Partial { accepted: usize, expected: usize },
}

impl core::fmt::Display for SendError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "Transport unavailable"),
            Self::Rejected => write!(f, "Datagram rejected"),
            Self::Partial { accepted, expected } => {
                write!(f, "Partial send: {} of {} bytes", accepted, expected)
            }
        }
    }
}

impl core::error::Error for SendError {}

/// Classify a byte count reported by an underlying send call
///
/// Only a complete write counts as success. Adapters over APIs that return
/// the number of bytes accepted should route that count through here.
pub fn ensure_complete(accepted: usize, expected: usize) -> Result<(), SendError> {
    if accepted == expected {
        Ok(())
    } else {
        Err(SendError::Partial { accepted, expected })
    }
}

/// Capability for sending one datagram to a destination fixed at setup
///
/// Connectionless: success means the local stack took every byte, nothing
/// more. Implementors never retry or resume.
pub trait Transport {
    /// Send `datagram` in a single call
    fn send(
        &mut self,
        datagram: &[u8],
    ) -> impl core::future::Future<Output = Result<(), SendError>>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(
        &mut self,
        datagram: &[u8],
    ) -> impl core::future::Future<Output = Result<(), SendError>> {
        T::send(self, datagram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_write_is_success() {
        assert_eq!(ensure_complete(12, 12), Ok(()));
        assert_eq!(ensure_complete(0, 0), Ok(()));
    }

    #[test]
    fn test_short_write_is_failure() {
        assert_eq!(
            ensure_complete(8, 12),
            Err(SendError::Partial {
                accepted: 8,
                expected: 12
            })
        );
        assert!(ensure_complete(0, 12).is_err());
    }
}
