//! Contract-level error taxonomy
//!
//! Operations that can fail return one of these; queries that are defined
//! as fail-soft absorb the problem, return a benign default, and bump a
//! counter in [`crate::diag`] instead.

use krepis_hal::{BusError, FlashError, PortError};

/// Errors surfaced across the interpreter-facing contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// Logical pin has no entry in the board's pinout table
    UnknownPin,
    /// The pinout table itself is invalid for this board
    InvalidPinout,
    /// The pin cannot enter the requested electrical mode
    UnsupportedPinState,
    /// Operation does not apply to the pin's current mode
    InvalidPinOperation,
    /// Timer armed while already armed; disable first
    TimerProtocolViolation,
    /// No free watch slot for another pin
    WatchExhausted,
    /// Bus operation on a device that was never configured
    DeviceNotReady,
    /// Caller-detected timeout on a transfer it was pacing
    ///
    /// Never raised internally; transfers have no cancellation, so
    /// deadline policy belongs to the caller and its clock.
    TransferTimeout,
    /// A port rejected a peripheral configuration
    Port(PortError),
    /// Bus-level transaction failure
    Bus(BusError),
    /// Flash access failure
    Flash(FlashError),
}

impl From<PortError> for HalError {
    fn from(err: PortError) -> Self {
        HalError::Port(err)
    }
}

impl From<BusError> for HalError {
    fn from(err: BusError) -> Self {
        HalError::Bus(err)
    }
}

impl From<FlashError> for HalError {
    fn from(err: FlashError) -> Self {
        HalError::Flash(err)
    }
}
