//! Port-agnostic board contract for the script interpreter
//!
//! This crate contains everything between the interpreter and a chip
//! port that does not depend on specific hardware:
//!
//! - The [`Board`] context tying one platform's ports together
//! - Pin registry and per-pin mode bookkeeping
//! - Edge watch table and the bounded event staging queue
//! - The single deferred wakeup timer
//! - Monotonic clock with 32-bit counter wrap folding
//! - Serial transmit pump and receive chunking
//! - SPI return-previous pipeline and I2C transactions
//! - Flash access checks over the port's page geometry
//! - Fail-soft diagnostics counters
//!
//! Chip ports implement the traits in `krepis-hal`; tests run against
//! the in-memory port in `krepis-hal-sim`.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod board;
pub mod bus;
pub mod clock;
pub mod diag;
pub mod error;
pub mod event;
pub mod flash;
pub mod pins;
pub mod queue;
pub mod serial;
pub mod timer;
pub mod watch;

pub use board::{Board, NullWake, WakeHook};
pub use bus::BusSet;
pub use clock::{from_millis, to_millis, SystemClock};
pub use diag::{DiagSnapshot, Diagnostics, Fault};
pub use error::HalError;
pub use event::{EventFlag, EventPayload, EventSink, IoEvent, MAX_RX_CHUNK};
pub use pins::{PinRegistry, MAX_PINS};
pub use queue::{EventQueue, QUEUE_DEPTH};
pub use serial::{SerialPump, TxSource};
pub use timer::{DeferredTimer, TimerState, MIN_TIMER_PERIOD_US};
pub use watch::{WatchTable, WATCH_SLOTS};
