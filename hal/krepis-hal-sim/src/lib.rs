//! In-memory port of the board contract
//!
//! Implements every trait in `krepis-hal` against plain memory so the
//! contract layer runs on the host: pin levels are arrays, flash is a
//! byte vector, the counter advances by a configurable step per read.
//! Each port records what was done to it, and exposes knobs to inject
//! inputs, so tests can both drive and inspect a whole board.

#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod i2c;
pub mod platform;
pub mod serial;
pub mod spi;
pub mod timer;

pub use flash::{SimFlash, SIM_FLASH_PAGE, SIM_FLASH_PAGES};
pub use gpio::{SimGpio, SIM_GPIO_COUNT};
pub use i2c::SimI2c;
pub use platform::{SimPlatform, SIM_PINOUT};
pub use serial::SimSerial;
pub use spi::SimSpi;
pub use timer::{SimCounter, SimCountdown};
