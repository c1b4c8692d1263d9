//! Pin identity, pin modes, and per-pin capability descriptors
//!
//! The interpreter addresses pins by a small logical number. Each board
//! publishes a static pinout table mapping logical numbers to physical
//! lines together with what each line can do. Everything above the port
//! layer works in terms of these types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Logical pin identifier as the interpreter sees it
///
/// A logical pin is only meaningful relative to a board's pinout table;
/// the same number maps to different silicon on different boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pin(pub u8);

/// Physical pin index on the chip's GPIO bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhysicalPin(pub u8);

/// Electrical configuration of a pin
///
/// Pins start out `Undefined` and return there on soft reset. Transitions
/// are validated against the pin's [`PinCaps`] before any hardware is
/// touched, so a rejected transition leaves the previous mode intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PinState {
    /// Never configured (or deconfigured by reset)
    Undefined,
    /// Push-pull digital output
    Output,
    /// Open-drain digital output
    OutputOpenDrain,
    /// Floating digital input
    Input,
    /// Digital input with internal pull-up
    InputPullUp,
    /// Digital input with internal pull-down
    InputPullDown,
    /// Analog input (ADC)
    AnalogIn,
    /// Analog output (DAC or PWM duty)
    AnalogOut,
    /// Routed to a peripheral function (UART, SPI, I2C, ...)
    Alternate,
    /// Peripheral function with open-drain driver
    AlternateOpenDrain,
}

impl PinState {
    /// Digital output modes (valid targets for a level write)
    pub fn is_output(self) -> bool {
        matches!(self, PinState::Output | PinState::OutputOpenDrain)
    }

    /// Digital input modes
    pub fn is_input(self) -> bool {
        matches!(
            self,
            PinState::Input | PinState::InputPullUp | PinState::InputPullDown
        )
    }

    /// Modes where a digital level read is meaningful
    ///
    /// Outputs read back their driven level; inputs read the line.
    pub fn is_readable(self) -> bool {
        self.is_input() || self.is_output()
    }

    /// Capabilities a pin must advertise before it may enter this mode
    pub const fn required_caps(self) -> PinCaps {
        match self {
            PinState::Undefined => PinCaps::NONE,
            PinState::Output => PinCaps::DIGITAL_OUT,
            PinState::OutputOpenDrain => PinCaps::DIGITAL_OUT.union(PinCaps::OPEN_DRAIN),
            PinState::Input => PinCaps::DIGITAL_IN,
            PinState::InputPullUp => PinCaps::DIGITAL_IN.union(PinCaps::PULL_UP),
            PinState::InputPullDown => PinCaps::DIGITAL_IN.union(PinCaps::PULL_DOWN),
            PinState::AnalogIn => PinCaps::ANALOG_IN,
            PinState::AnalogOut => PinCaps::ANALOG_OUT,
            PinState::Alternate => PinCaps::ALTERNATE,
            PinState::AlternateOpenDrain => PinCaps::ALTERNATE.union(PinCaps::OPEN_DRAIN),
        }
    }
}

/// What a physical pin is capable of
///
/// Bit set describing the functions a line supports. Declared per pin in
/// the board's pinout table and consulted before every mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinCaps(u16);

impl PinCaps {
    pub const NONE: Self = Self(0);
    pub const DIGITAL_IN: Self = Self(1 << 0);
    pub const DIGITAL_OUT: Self = Self(1 << 1);
    pub const PULL_UP: Self = Self(1 << 2);
    pub const PULL_DOWN: Self = Self(1 << 3);
    pub const OPEN_DRAIN: Self = Self(1 << 4);
    pub const ANALOG_IN: Self = Self(1 << 5);
    pub const ANALOG_OUT: Self = Self(1 << 6);
    pub const ALTERNATE: Self = Self(1 << 7);
    /// Edge detection / wake-capable line
    pub const WATCH: Self = Self(1 << 8);

    /// Combine two capability sets
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True when every capability in `other` is present in `self`
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when no capability is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl core::ops::BitOr for PinCaps {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// One row of a board's pinout table
///
/// The table index is the logical pin number; the entry names the physical
/// line it routes to and what that line supports.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinDesc {
    /// Physical line this logical pin routes to
    pub phys: PhysicalPin,
    /// Supported functions of that line
    pub caps: PinCaps,
}

impl PinDesc {
    pub const fn new(phys: u8, caps: PinCaps) -> Self {
        Self {
            phys: PhysicalPin(phys),
            caps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_contains() {
        let io = PinCaps::DIGITAL_IN.union(PinCaps::DIGITAL_OUT);
        assert!(io.contains(PinCaps::DIGITAL_IN));
        assert!(io.contains(PinCaps::DIGITAL_OUT));
        assert!(!io.contains(PinCaps::ANALOG_IN));
        assert!(PinCaps::NONE.is_empty());
        // NONE is a subset of everything
        assert!(io.contains(PinCaps::NONE));
    }

    #[test]
    fn test_required_caps_per_state() {
        assert!(PinState::Undefined.required_caps().is_empty());
        assert!(PinState::InputPullUp
            .required_caps()
            .contains(PinCaps::DIGITAL_IN.union(PinCaps::PULL_UP)));
        assert!(PinState::OutputOpenDrain
            .required_caps()
            .contains(PinCaps::OPEN_DRAIN));
        assert!(!PinState::Output.required_caps().contains(PinCaps::OPEN_DRAIN));
    }

    #[test]
    fn test_state_predicates() {
        assert!(PinState::Output.is_output());
        assert!(PinState::OutputOpenDrain.is_output());
        assert!(!PinState::Input.is_output());

        assert!(PinState::InputPullDown.is_input());
        assert!(!PinState::AnalogIn.is_input());

        assert!(PinState::Output.is_readable());
        assert!(PinState::Input.is_readable());
        assert!(!PinState::Undefined.is_readable());
        assert!(!PinState::Alternate.is_readable());
    }
}
