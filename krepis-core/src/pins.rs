//! Pin registry: logical numbering, capability checks, mode bookkeeping
//!
//! Every interpreter-facing pin operation resolves its logical pin here
//! before any hardware is touched. The registry owns the board's pinout
//! table, rejects pins outside it, validates requested modes against the
//! per-pin capabilities, and remembers the last mode each pin entered so
//! `pin_get_state` answers without a hardware readback.

use krepis_hal::{PhysicalPin, Pin, PinDesc, PinState};

use crate::error::HalError;

/// Upper bound on pinout table length
pub const MAX_PINS: usize = 40;

/// Logical pin table plus per-pin mode store
pub struct PinRegistry {
    pinout: &'static [PinDesc],
    states: [PinState; MAX_PINS],
}

impl PinRegistry {
    /// Validate a pinout table against the GPIO bank it routes into
    ///
    /// Rejects tables longer than [`MAX_PINS`], entries whose physical
    /// pin falls outside the bank, and two logical pins sharing a line.
    pub fn new(pinout: &'static [PinDesc], bank_pins: u8) -> Result<Self, HalError> {
        if pinout.len() > MAX_PINS {
            return Err(HalError::InvalidPinout);
        }
        for (i, desc) in pinout.iter().enumerate() {
            if desc.phys.0 >= bank_pins {
                return Err(HalError::InvalidPinout);
            }
            if pinout[..i].iter().any(|prev| prev.phys == desc.phys) {
                return Err(HalError::InvalidPinout);
            }
        }
        Ok(Self {
            pinout,
            states: [PinState::Undefined; MAX_PINS],
        })
    }

    /// Number of logical pins on this board
    pub fn len(&self) -> usize {
        self.pinout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pinout.is_empty()
    }

    /// Pinout entry for a logical pin
    pub fn lookup(&self, pin: Pin) -> Result<&PinDesc, HalError> {
        self.pinout
            .get(pin.0 as usize)
            .ok_or(HalError::UnknownPin)
    }

    /// Physical line behind a logical pin
    pub fn phys(&self, pin: Pin) -> Result<PhysicalPin, HalError> {
        self.lookup(pin).map(|desc| desc.phys)
    }

    /// Check a mode change against the pin's capabilities
    ///
    /// Returns the pinout entry so callers reach the physical pin without
    /// a second lookup. No state is recorded here.
    pub fn validate_for_state(&self, pin: Pin, state: PinState) -> Result<&PinDesc, HalError> {
        let desc = self.lookup(pin)?;
        if !desc.caps.contains(state.required_caps()) {
            return Err(HalError::UnsupportedPinState);
        }
        Ok(desc)
    }

    /// Last successfully recorded mode, `Undefined` for unknown pins
    pub fn state_of(&self, pin: Pin) -> PinState {
        let idx = pin.0 as usize;
        // pinout.len() <= MAX_PINS holds from construction
        if idx < self.pinout.len() {
            self.states[idx]
        } else {
            PinState::Undefined
        }
    }

    /// Record a mode after the port accepted it
    pub fn record_state(&mut self, pin: Pin, state: PinState) {
        let idx = pin.0 as usize;
        if idx < self.pinout.len() {
            self.states[idx] = state;
        }
    }

    /// Reverse lookup: which logical pin routes to this line, if any
    pub fn logical_for(&self, phys: PhysicalPin) -> Option<Pin> {
        self.pinout
            .iter()
            .position(|desc| desc.phys == phys)
            .map(|i| Pin(i as u8))
    }

    /// Forget every recorded mode (soft reset)
    pub fn reset(&mut self) {
        self.states = [PinState::Undefined; MAX_PINS];
    }
}
