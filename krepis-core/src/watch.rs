//! Event watch table
//!
//! Fixed pool of watch slots mapping watched pins to stable event flags.
//! The slot index is the flag: a pin keeps its flag for the whole time it
//! is watched, re-watching is idempotent, and a slot is reused only after
//! the pin is unwatched. Interrupt handlers resolve edges to flags here,
//! so every lookup is one short critical section.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;
use krepis_hal::{PhysicalPin, Pin};

use crate::error::HalError;
use crate::event::EventFlag;

/// Number of simultaneously watchable pins
pub const WATCH_SLOTS: usize = 16;

#[derive(Debug, Clone, Copy)]
struct WatchEntry {
    pin: Pin,
    phys: PhysicalPin,
}

/// Slot table behind a critical-section mutex
pub struct WatchTable {
    slots: Mutex<CriticalSectionRawMutex, RefCell<[Option<WatchEntry>; WATCH_SLOTS]>>,
}

impl WatchTable {
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new([None; WATCH_SLOTS])),
        }
    }

    /// Claim a slot for a pin and return its flag
    ///
    /// A pin that is already watched gets its existing flag back, never
    /// a second slot.
    pub fn attach(&self, pin: Pin, phys: PhysicalPin) -> Result<EventFlag, HalError> {
        self.slots.lock(|slots| {
            let mut slots = slots.borrow_mut();
            let mut free = None;
            for (i, slot) in slots.iter().enumerate() {
                match slot {
                    Some(entry) if entry.pin == pin => return Ok(EventFlag::Edge(i as u8)),
                    None if free.is_none() => free = Some(i),
                    _ => {}
                }
            }
            let i = free.ok_or(HalError::WatchExhausted)?;
            slots[i] = Some(WatchEntry { pin, phys });
            Ok(EventFlag::Edge(i as u8))
        })
    }

    /// Release a pin's slot, returning the line that was armed
    ///
    /// `None` when the pin was not watched.
    pub fn detach(&self, pin: Pin) -> Option<PhysicalPin> {
        self.slots.lock(|slots| {
            let mut slots = slots.borrow_mut();
            for slot in slots.iter_mut() {
                if let Some(entry) = slot {
                    if entry.pin == pin {
                        let phys = entry.phys;
                        *slot = None;
                        return Some(phys);
                    }
                }
            }
            None
        })
    }

    /// Flag currently assigned to a pin
    pub fn flag_for(&self, pin: Pin) -> Option<EventFlag> {
        self.slots.lock(|slots| {
            slots
                .borrow()
                .iter()
                .position(|slot| slot.map(|e| e.pin == pin).unwrap_or(false))
                .map(|i| EventFlag::Edge(i as u8))
        })
    }

    /// Flag watching a physical line, for interrupt-side resolution
    pub fn flag_for_phys(&self, phys: PhysicalPin) -> Option<EventFlag> {
        self.slots.lock(|slots| {
            slots
                .borrow()
                .iter()
                .position(|slot| slot.map(|e| e.phys == phys).unwrap_or(false))
                .map(|i| EventFlag::Edge(i as u8))
        })
    }

    /// Physical line behind a flag, `None` for stale or non-edge flags
    pub fn phys_for_flag(&self, flag: EventFlag) -> Option<PhysicalPin> {
        let EventFlag::Edge(slot) = flag else {
            return None;
        };
        self.slots.lock(|slots| {
            slots
                .borrow()
                .get(slot as usize)
                .and_then(|entry| entry.map(|e| e.phys))
        })
    }

    /// True while the pin holds a slot
    pub fn is_watched(&self, pin: Pin) -> bool {
        self.flag_for(pin).is_some()
    }

    /// Empty the table, returning every line that was armed (soft reset)
    pub fn drain(&self) -> Vec<PhysicalPin, WATCH_SLOTS> {
        self.slots.lock(|slots| {
            let mut slots = slots.borrow_mut();
            let mut armed = Vec::new();
            for slot in slots.iter_mut() {
                if let Some(entry) = slot.take() {
                    // capacity equals slot count, push cannot fail
                    let _ = armed.push(entry.phys);
                }
            }
            armed
        })
    }
}

impl Default for WatchTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_is_idempotent() {
        let table = WatchTable::new();
        let flag = table.attach(Pin(3), PhysicalPin(13)).unwrap();
        let again = table.attach(Pin(3), PhysicalPin(13)).unwrap();
        assert_eq!(flag, again);
        assert_eq!(table.flag_for(Pin(3)), Some(flag));
    }

    #[test]
    fn test_slot_reuse_after_detach() {
        let table = WatchTable::new();
        let first = table.attach(Pin(0), PhysicalPin(0)).unwrap();
        assert_eq!(table.detach(Pin(0)), Some(PhysicalPin(0)));
        assert!(!table.is_watched(Pin(0)));

        // Freed slot is available again, other pins unaffected
        let second = table.attach(Pin(1), PhysicalPin(1)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_exhaustion() {
        let table = WatchTable::new();
        for i in 0..WATCH_SLOTS as u8 {
            table.attach(Pin(i), PhysicalPin(i)).unwrap();
        }
        assert_eq!(
            table.attach(Pin(40), PhysicalPin(40)).err(),
            Some(HalError::WatchExhausted)
        );
        // An already-watched pin still resolves
        assert!(table.attach(Pin(2), PhysicalPin(2)).is_ok());
    }

    #[test]
    fn test_phys_resolution() {
        let table = WatchTable::new();
        let flag = table.attach(Pin(5), PhysicalPin(25)).unwrap();

        assert_eq!(table.flag_for_phys(PhysicalPin(25)), Some(flag));
        assert_eq!(table.phys_for_flag(flag), Some(PhysicalPin(25)));
        assert_eq!(table.flag_for_phys(PhysicalPin(26)), None);

        table.detach(Pin(5));
        assert_eq!(table.phys_for_flag(flag), None);
    }

    #[test]
    fn test_drain_reports_armed_lines() {
        let table = WatchTable::new();
        table.attach(Pin(0), PhysicalPin(10)).unwrap();
        table.attach(Pin(1), PhysicalPin(11)).unwrap();

        let armed = table.drain();
        assert_eq!(armed.len(), 2);
        assert!(armed.contains(&PhysicalPin(10)));
        assert!(armed.contains(&PhysicalPin(11)));
        assert!(!table.is_watched(Pin(0)));
    }
}
