//! Krepis Hardware Abstraction Layer
//!
//! This crate defines the port traits and pin vocabulary that sit between
//! the board contract layer (`krepis-core`) and chip-specific code. A chip
//! crate implements the bank traits over its registers; everything above
//! them stays identical across boards.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Interpreter core (portable)            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  krepis-core (board contract)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  krepis-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ chip crate    │       │ krepis-hal-   │
//! │ (real boards) │       │ sim (tests)   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioBank`] - digital and analog pin access
//! - [`uart::SerialBank`] - blocking serial byte I/O
//! - [`spi::SpiBank`], [`i2c::I2cBank`] - synchronous bus masters
//! - [`flash::FlashPort`] - raw page-organized flash
//! - [`timer::CounterPort`], [`timer::CountdownPort`] - timing hardware
//! - [`platform::Platform`] - one board's complete peripheral set

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod gpio;
pub mod i2c;
pub mod pin;
pub mod platform;
pub mod spi;
pub mod timer;
pub mod uart;

// Re-export key types at crate root for convenience
pub use flash::{FlashError, FlashPage, FlashPort};
pub use gpio::{GpioBank, PortError};
pub use i2c::{BusError, I2cBank, I2cConfig, I2cDevice};
pub use pin::{PhysicalPin, Pin, PinCaps, PinDesc, PinState};
pub use platform::{Device, Platform};
pub use spi::{Mode, Phase, Polarity, SpiBank, SpiConfig, SpiDevice};
pub use timer::{CountdownPort, CounterPort};
pub use uart::{DataBits, Parity, SerialBank, SerialConfig, SerialDevice, StopBits};
