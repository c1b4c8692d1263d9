//! Bounded staging queue between interrupt and normal context
//!
//! Interrupt handlers push, the normal-context drain pops. The ring
//! never blocks the producer: when full it discards its oldest record
//! and accepts the new one, so the freshest hardware activity survives
//! a stalled interpreter. Every access is one short critical section.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

use crate::event::{EventFlag, IoEvent};

/// Capacity of the staging ring
pub const QUEUE_DEPTH: usize = 32;

/// Drop-oldest event ring
pub struct EventQueue {
    ring: Mutex<CriticalSectionRawMutex, RefCell<Deque<IoEvent, QUEUE_DEPTH>>>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            ring: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Stage an event, evicting the oldest one if the ring is full
    ///
    /// Returns `true` when an old event had to be discarded. Safe from
    /// interrupt context.
    pub fn push(&self, event: IoEvent) -> bool {
        self.ring.lock(|ring| {
            let mut ring = ring.borrow_mut();
            let dropped = ring.is_full();
            if dropped {
                ring.pop_front();
            }
            // cannot fail after the eviction above
            let _ = ring.push_back(event);
            dropped
        })
    }

    /// Take the oldest staged event
    pub fn pop(&self) -> Option<IoEvent> {
        self.ring.lock(|ring| ring.borrow_mut().pop_front())
    }

    /// Number of staged events
    pub fn len(&self) -> usize {
        self.ring.lock(|ring| ring.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every staged event carrying `flag`, keeping the rest in order
    pub fn purge(&self, flag: EventFlag) {
        self.ring.lock(|ring| {
            let mut ring = ring.borrow_mut();
            for _ in 0..ring.len() {
                if let Some(event) = ring.pop_front() {
                    if event.flag != flag {
                        // an element was just popped, the ring has room
                        let _ = ring.push_back(event);
                    }
                }
            }
        });
    }

    /// Discard everything staged
    pub fn clear(&self) {
        self.ring.lock(|ring| {
            let mut ring = ring.borrow_mut();
            while ring.pop_front().is_some() {}
        });
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventFlag, EventPayload};

    fn edge(slot: u8, at_us: u64) -> IoEvent {
        IoEvent {
            flag: EventFlag::Edge(slot),
            payload: EventPayload::Edge { at_us, level: true },
        }
    }

    #[test]
    fn test_fifo_order() {
        let queue = EventQueue::new();
        assert!(!queue.push(edge(0, 1)));
        assert!(!queue.push(edge(1, 2)));

        assert_eq!(queue.pop().unwrap().flag, EventFlag::Edge(0));
        assert_eq!(queue.pop().unwrap().flag, EventFlag::Edge(1));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_full_queue_drops_oldest() {
        let queue = EventQueue::new();
        for i in 0..QUEUE_DEPTH {
            assert!(!queue.push(edge(0, i as u64)));
        }
        assert_eq!(queue.len(), QUEUE_DEPTH);

        // Two more: the two oldest records give way
        assert!(queue.push(edge(0, 1000)));
        assert!(queue.push(edge(0, 1001)));
        assert_eq!(queue.len(), QUEUE_DEPTH);

        let first = queue.pop().unwrap();
        match first.payload {
            EventPayload::Edge { at_us, .. } => assert_eq!(at_us, 2),
            _ => panic!("expected edge payload"),
        }
    }

    #[test]
    fn test_clear() {
        let queue = EventQueue::new();
        queue.push(edge(0, 1));
        queue.push(edge(1, 2));
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_purge_removes_only_matching_flags() {
        let queue = EventQueue::new();
        queue.push(edge(0, 1));
        queue.push(edge(1, 2));
        queue.push(edge(0, 3));
        queue.push(edge(2, 4));

        queue.purge(EventFlag::Edge(0));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().flag, EventFlag::Edge(1));
        assert_eq!(queue.pop().unwrap().flag, EventFlag::Edge(2));
        assert!(queue.pop().is_none());
    }
}
