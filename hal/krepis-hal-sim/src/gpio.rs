//! In-memory GPIO bank

use krepis_hal::{GpioBank, PhysicalPin, PinState, PortError};

/// Physical pins in the simulated bank
pub const SIM_GPIO_COUNT: u8 = 16;

const LINES: usize = SIM_GPIO_COUNT as usize;

/// GPIO bank backed by plain arrays
///
/// Records the last mode applied to each pad and the current level.
/// Input levels are injected with [`SimGpio::drive_input`]; everything
/// is readable back for assertions.
#[derive(Debug)]
pub struct SimGpio {
    levels: [bool; LINES],
    modes: [Option<PinState>; LINES],
    edges: [bool; LINES],
    analog_in: [u16; LINES],
    analog_out: [u16; LINES],
}

impl SimGpio {
    pub fn new() -> Self {
        Self {
            levels: [false; LINES],
            modes: [None; LINES],
            edges: [false; LINES],
            analog_in: [0; LINES],
            analog_out: [0; LINES],
        }
    }

    /// Simulate an external signal on an input pad
    pub fn drive_input(&mut self, pin: PhysicalPin, high: bool) {
        self.levels[usize::from(pin.0)] = high;
    }

    /// Set the raw sample an analog read of this pad will return
    pub fn set_analog_input(&mut self, pin: PhysicalPin, raw: u16) {
        self.analog_in[usize::from(pin.0)] = raw.min(4095);
    }

    /// Current level of a pad
    pub fn level(&self, pin: PhysicalPin) -> bool {
        self.levels[usize::from(pin.0)]
    }

    /// Last mode applied to a pad, `None` if never configured
    pub fn mode_of(&self, pin: PhysicalPin) -> Option<PinState> {
        self.modes[usize::from(pin.0)]
    }

    /// Whether edge detection is armed on a pad
    pub fn edge_armed(&self, pin: PhysicalPin) -> bool {
        self.edges[usize::from(pin.0)]
    }

    /// Last analog duty written to a pad
    pub fn analog_duty(&self, pin: PhysicalPin) -> u16 {
        self.analog_out[usize::from(pin.0)]
    }
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioBank for SimGpio {
    const PIN_COUNT: u8 = SIM_GPIO_COUNT;

    fn configure(&mut self, pin: PhysicalPin, state: PinState) -> Result<(), PortError> {
        self.modes[usize::from(pin.0)] = Some(state);
        Ok(())
    }

    fn write(&mut self, pin: PhysicalPin, high: bool) {
        self.levels[usize::from(pin.0)] = high;
    }

    fn read(&self, pin: PhysicalPin) -> bool {
        self.levels[usize::from(pin.0)]
    }

    fn set_edge_detect(&mut self, pin: PhysicalPin, enable: bool) {
        self.edges[usize::from(pin.0)] = enable;
    }

    fn read_analog(&mut self, pin: PhysicalPin) -> u16 {
        self.analog_in[usize::from(pin.0)]
    }

    fn write_analog(&mut self, pin: PhysicalPin, value: u16) {
        self.analog_out[usize::from(pin.0)] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_modes_and_levels() {
        let mut gpio = SimGpio::new();
        assert_eq!(gpio.mode_of(PhysicalPin(3)), None);

        gpio.configure(PhysicalPin(3), PinState::Output).unwrap();
        gpio.write(PhysicalPin(3), true);

        assert_eq!(gpio.mode_of(PhysicalPin(3)), Some(PinState::Output));
        assert!(gpio.read(PhysicalPin(3)));
        assert!(!gpio.read(PhysicalPin(4)));
    }

    #[test]
    fn test_analog_sample_is_clamped_to_12_bits() {
        let mut gpio = SimGpio::new();
        gpio.set_analog_input(PhysicalPin(0), u16::MAX);
        assert_eq!(gpio.read_analog(PhysicalPin(0)), 4095);
    }
}
