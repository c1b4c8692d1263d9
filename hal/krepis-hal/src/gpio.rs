//! GPIO bank abstraction
//!
//! One trait for the whole digital I/O block, indexed by physical pin.
//! Chip crates implement it over their pad/control registers; the board
//! contract layer drives it through the pinout table.

use crate::pin::{PhysicalPin, PinState};

/// Failure reported by a port when applying a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortError {
    /// The hardware cannot provide the requested mode or routing
    Unsupported,
    /// The configuration values are out of range for this peripheral
    InvalidConfig,
}

/// Digital and analog pin access for one GPIO bank
///
/// Implementations own the pad registers; they do not track logical pin
/// mapping or mode bookkeeping, which live above in the contract layer.
pub trait GpioBank {
    /// Number of physical pins in the bank
    ///
    /// Pinout tables are validated against this bound at construction.
    const PIN_COUNT: u8;

    /// Apply an electrical mode to a pin
    ///
    /// `PinState::Undefined` returns the pad to its reset configuration.
    fn configure(&mut self, pin: PhysicalPin, state: PinState) -> Result<(), PortError>;

    /// Drive an output pin to a level
    fn write(&mut self, pin: PhysicalPin, high: bool);

    /// Read the current level of a pin
    ///
    /// Must be callable from interrupt context: a plain register read,
    /// no blocking, no allocation.
    fn read(&self, pin: PhysicalPin) -> bool;

    /// Arm or disarm edge detection on a pin
    ///
    /// While armed, the chip's GPIO interrupt reports both edges for the
    /// line; delivery into the event pipeline happens above this trait.
    fn set_edge_detect(&mut self, pin: PhysicalPin, enable: bool);

    /// Sample an analog input, full-scale 12-bit (0..=4095)
    fn read_analog(&mut self, pin: PhysicalPin) -> u16;

    /// Set an analog output level, full-scale 16-bit duty (0..=65535)
    fn write_analog(&mut self, pin: PhysicalPin, value: u16);
}
