//! The assembled simulated board

use krepis_hal::{PinCaps, PinDesc, Platform};

use crate::flash::SimFlash;
use crate::gpio::SimGpio;
use crate::i2c::SimI2c;
use crate::serial::SimSerial;
use crate::spi::SimSpi;
use crate::timer::{SimCounter, SimCountdown};

const IO: PinCaps = PinCaps::DIGITAL_IN.union(PinCaps::DIGITAL_OUT);
const PULLS: PinCaps = PinCaps::PULL_UP.union(PinCaps::PULL_DOWN);

/// Pinout of the simulated board
///
/// Deliberately uneven so capability gating is testable: an input-only
/// pad, analog-only pads, a pad with no watch support, and a last entry
/// whose physical number is not its logical number.
pub static SIM_PINOUT: &[PinDesc] = &[
    PinDesc::new(
        0,
        IO.union(PULLS)
            .union(PinCaps::OPEN_DRAIN)
            .union(PinCaps::ALTERNATE)
            .union(PinCaps::WATCH),
    ),
    PinDesc::new(
        1,
        IO.union(PULLS).union(PinCaps::ALTERNATE).union(PinCaps::WATCH),
    ),
    PinDesc::new(2, IO.union(PinCaps::ALTERNATE).union(PinCaps::WATCH)),
    PinDesc::new(3, PinCaps::DIGITAL_IN.union(PinCaps::PULL_UP)),
    PinDesc::new(4, IO.union(PinCaps::ANALOG_IN).union(PinCaps::ALTERNATE)),
    PinDesc::new(5, IO.union(PinCaps::ANALOG_OUT).union(PinCaps::ALTERNATE)),
    PinDesc::new(6, IO.union(PinCaps::ALTERNATE)),
    PinDesc::new(10, IO.union(PinCaps::WATCH)),
];

/// A whole board in memory
///
/// Bundles one of each simulated port behind the [`Platform`] trait.
/// The `&self` accessors expose the ports the trait only hands out
/// mutably, so tests can inspect state through a shared borrow.
#[derive(Debug)]
pub struct SimPlatform {
    pinout: &'static [PinDesc],
    gpio: SimGpio,
    serial: SimSerial,
    spi: SimSpi,
    i2c: SimI2c,
    flash: SimFlash,
    counter: SimCounter,
    countdown: SimCountdown,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self::with_pinout(SIM_PINOUT)
    }

    /// Build a board with a different pinout table
    pub fn with_pinout(pinout: &'static [PinDesc]) -> Self {
        Self {
            pinout,
            gpio: SimGpio::new(),
            serial: SimSerial::new(),
            spi: SimSpi::new(),
            i2c: SimI2c::new(),
            flash: SimFlash::new(),
            counter: SimCounter::new(),
            countdown: SimCountdown::new(),
        }
    }

    pub fn serial(&self) -> &SimSerial {
        &self.serial
    }

    pub fn spi(&self) -> &SimSpi {
        &self.spi
    }

    pub fn i2c(&self) -> &SimI2c {
        &self.i2c
    }

    pub fn countdown(&self) -> &SimCountdown {
        &self.countdown
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for SimPlatform {
    type Gpio = SimGpio;
    type Serial = SimSerial;
    type Spi = SimSpi;
    type I2c = SimI2c;
    type Flash = SimFlash;
    type Counter = SimCounter;
    type Countdown = SimCountdown;

    fn pinout(&self) -> &'static [PinDesc] {
        self.pinout
    }

    fn gpio(&self) -> &Self::Gpio {
        &self.gpio
    }

    fn gpio_mut(&mut self) -> &mut Self::Gpio {
        &mut self.gpio
    }

    fn serial_mut(&mut self) -> &mut Self::Serial {
        &mut self.serial
    }

    fn spi_mut(&mut self) -> &mut Self::Spi {
        &mut self.spi
    }

    fn i2c_mut(&mut self) -> &mut Self::I2c {
        &mut self.i2c
    }

    fn flash(&self) -> &Self::Flash {
        &self.flash
    }

    fn flash_mut(&mut self) -> &mut Self::Flash {
        &mut self.flash
    }

    fn counter(&self) -> &Self::Counter {
        &self.counter
    }

    fn countdown_mut(&mut self) -> &mut Self::Countdown {
        &mut self.countdown
    }
}
