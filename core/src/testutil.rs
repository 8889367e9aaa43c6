//! Test doubles shared by the unit tests
#![allow(dead_code)]

use core::cell::Cell;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use heapless::Vec;
use relay_hal::{
    ensure_complete, FetchError, RawSample, SendError, SensorBackend, Transport, UptimeClock,
};

/// Sensor that replays a fixed script of outcomes, then keeps failing
pub struct ScriptedSensor {
    script: Vec<Result<RawSample, FetchError>, 16>,
    next: usize,
}

impl ScriptedSensor {
    pub fn new(script: &[Result<RawSample, FetchError>]) -> Self {
        Self {
            script: Vec::from_slice(script).unwrap(),
            next: 0,
        }
    }

    pub fn calls(&self) -> usize {
        self.next
    }
}

impl SensorBackend for ScriptedSensor {
    async fn fetch(&mut self) -> Result<RawSample, FetchError> {
        let outcome = self
            .script
            .get(self.next)
            .copied()
            .unwrap_or(Err(FetchError::NotReady));
        self.next += 1;
        outcome
    }
}

/// Transport that records datagrams and accepts at most `limit` bytes
pub struct RecordingTransport {
    sent: Vec<Vec<u8, 32>, 16>,
    limit: Option<usize>,
    attempts: usize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            limit: None,
            attempts: 0,
        }
    }

    /// Transport whose stack only takes the first `limit` bytes
    pub fn short_writing(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Datagrams fully accepted so far
    pub fn sent(&self) -> &[Vec<u8, 32>] {
        &self.sent
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn accept_everything(&mut self) {
        self.limit = None;
    }
}

impl Transport for RecordingTransport {
    async fn send(&mut self, datagram: &[u8]) -> Result<(), SendError> {
        self.attempts += 1;
        let accepted = self.limit.map_or(datagram.len(), |l| l.min(datagram.len()));
        ensure_complete(accepted, datagram.len())?;
        self.sent
            .push(Vec::from_slice(datagram).unwrap())
            .unwrap();
        Ok(())
    }
}

/// Clock advanced by hand
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: u32) {
        self.now.set(now_ms);
    }
}

impl UptimeClock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

/// Delay that returns immediately and totals what was asked of it
#[derive(Default)]
pub struct RecordingDelay {
    pub total_ms: u64,
    pub calls: usize,
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ms += u64::from(ns) / 1_000_000;
        self.calls += 1;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.total_ms += u64::from(ms);
        self.calls += 1;
    }
}

/// I2C bus double for the SHT3x driver
///
/// Records the last write and answers reads with a canned frame.
pub struct FakeI2c {
    pub response: [u8; 6],
    pub nack_on_write: bool,
    pub fail_read: bool,
    pub last_write: Vec<u8, 4>,
    pub last_address: Option<u8>,
    pub reads: usize,
}

impl FakeI2c {
    pub fn new(response: [u8; 6]) -> Self {
        Self {
            response,
            nack_on_write: false,
            fail_read: false,
            last_write: Vec::new(),
            last_address: None,
            reads: 0,
        }
    }
}

impl ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.last_address = Some(address);
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if self.nack_on_write {
                        return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
                    }
                    self.last_write = Vec::from_slice(bytes).unwrap();
                }
                Operation::Read(buf) => {
                    if self.fail_read {
                        return Err(ErrorKind::Bus);
                    }
                    self.reads += 1;
                    let n = buf.len().min(self.response.len());
                    buf[..n].copy_from_slice(&self.response[..n]);
                }
            }
        }
        Ok(())
    }
}

/// Delay for drivers that need one but whose timing is irrelevant to the test
pub struct NoDelay;

impl DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}
