//! One-slot coalescing handoff between a timer interrupt and a worker
//!
//! The producer side runs in a restricted context: it must not block, must
//! not allocate and must return quickly. `post` only flips a pending flag
//! under a short critical section and wakes the worker.
//!
//! At most one unit of work is ever pending. A tick that arrives while one is
//! already pending is coalesced into it. A tick that arrives while the worker
//! is busy (after it took the pending tick) queues exactly one more.

use core::cell::Cell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::AtomicWaker;

/// Unit of deferred work handed to the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick {
    /// Number of the tick that queued this work (1-based, wrapping)
    pub sequence: u32,
}

/// Result of posting a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Post {
    /// Slot was empty; a new unit of work is pending
    Queued,
    /// Work was already pending; this tick folded into it
    Coalesced,
}

#[derive(Clone, Copy)]
struct SlotState {
    pending: Option<Tick>,
    issued: u32,
    coalesced: u32,
}

/// Single-slot coalescing handoff
pub struct TickSlot {
    state: Mutex<CriticalSectionRawMutex, Cell<SlotState>>,
    waker: AtomicWaker,
}

impl TickSlot {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(SlotState {
                pending: None,
                issued: 0,
                coalesced: 0,
            })),
            waker: AtomicWaker::new(),
        }
    }

    /// Record a tick. Safe to call from interrupt context.
    pub fn post(&self) -> Post {
        let outcome = self.state.lock(|cell| {
            let mut state = cell.get();
            state.issued = state.issued.wrapping_add(1);
            let outcome = if state.pending.is_some() {
                state.coalesced = state.coalesced.wrapping_add(1);
                Post::Coalesced
            } else {
                state.pending = Some(Tick {
                    sequence: state.issued,
                });
                Post::Queued
            };
            cell.set(state);
            outcome
        });
        if outcome == Post::Queued {
            self.waker.wake();
        }
        outcome
    }

    /// Take the pending tick without waiting
    pub fn try_take(&self) -> Option<Tick> {
        self.state.lock(|cell| {
            let mut state = cell.get();
            let tick = state.pending.take();
            cell.set(state);
            tick
        })
    }

    /// Wait until a tick is pending and take it
    ///
    /// Only one task may wait on a slot.
    pub async fn wait(&self) -> Tick {
        poll_fn(|cx| {
            self.waker.register(cx.waker());
            match self.try_take() {
                Some(tick) => Poll::Ready(tick),
                None => Poll::Pending,
            }
        })
        .await
    }

    /// Whether a unit of work is pending
    pub fn is_pending(&self) -> bool {
        self.state.lock(|cell| cell.get().pending.is_some())
    }

    /// Ticks posted so far (wrapping)
    pub fn issued(&self) -> u32 {
        self.state.lock(|cell| cell.get().issued)
    }

    /// Ticks folded into an already pending unit of work (wrapping)
    pub fn coalesced(&self) -> u32 {
        self.state.lock(|cell| cell.get().coalesced)
    }
}

impl Default for TickSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_first_post_queues() {
        let slot = TickSlot::new();
        assert!(!slot.is_pending());
        assert_eq!(slot.post(), Post::Queued);
        assert!(slot.is_pending());
        assert_eq!(slot.try_take(), Some(Tick { sequence: 1 }));
        assert_eq!(slot.try_take(), None);
    }

    #[test]
    fn test_ticks_coalesce_while_pending() {
        let slot = TickSlot::new();
        assert_eq!(slot.post(), Post::Queued);
        assert_eq!(slot.post(), Post::Coalesced);
        assert_eq!(slot.post(), Post::Coalesced);
        assert_eq!(slot.issued(), 3);
        assert_eq!(slot.coalesced(), 2);
        // The pending unit keeps the sequence of the tick that queued it
        assert_eq!(slot.try_take(), Some(Tick { sequence: 1 }));
        assert_eq!(slot.try_take(), None);
    }

    #[test]
    fn test_tick_during_work_queues_one_more() {
        let slot = TickSlot::new();
        slot.post();
        let running = slot.try_take();
        assert!(running.is_some());
        // Two ticks arrive while the worker is busy with `running`
        assert_eq!(slot.post(), Post::Queued);
        assert_eq!(slot.post(), Post::Coalesced);
        assert_eq!(slot.try_take(), Some(Tick { sequence: 2 }));
        assert_eq!(slot.try_take(), None);
    }

    #[test]
    fn test_wait_returns_pending_tick() {
        let slot = TickSlot::new();
        slot.post();
        assert_eq!(block_on(slot.wait()), Tick { sequence: 1 });
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_wait_wakes_on_post_from_other_thread() {
        use std::sync::Arc;
        use std::thread;
        use std::time::Duration;

        let slot = Arc::new(TickSlot::new());
        let producer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                slot.post()
            })
        };
        let tick = block_on(slot.wait());
        assert_eq!(tick, Tick { sequence: 1 });
        assert_eq!(producer.join().unwrap(), Post::Queued);
    }

    #[test]
    fn test_backlog_never_exceeds_one() {
        let slot = TickSlot::new();
        for _ in 0..100 {
            slot.post();
        }
        assert_eq!(slot.coalesced(), 99);
        assert!(slot.try_take().is_some());
        assert!(slot.try_take().is_none());
    }
}
