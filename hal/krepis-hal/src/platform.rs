//! Root platform trait
//!
//! Aggregates one chip's port implementations behind associated types so
//! the contract layer is generic over boards with zero-cost dispatch.

use crate::flash::FlashPort;
use crate::gpio::GpioBank;
use crate::i2c::{I2cBank, I2cDevice};
use crate::pin::PinDesc;
use crate::spi::{SpiBank, SpiDevice};
use crate::timer::{CountdownPort, CounterPort};
use crate::uart::{SerialBank, SerialDevice};

/// Any peripheral device id, for queries that span device kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Device {
    Serial(SerialDevice),
    Spi(SpiDevice),
    I2c(I2cDevice),
}

impl From<SerialDevice> for Device {
    fn from(dev: SerialDevice) -> Self {
        Device::Serial(dev)
    }
}

impl From<SpiDevice> for Device {
    fn from(dev: SpiDevice) -> Self {
        Device::Spi(dev)
    }
}

impl From<I2cDevice> for Device {
    fn from(dev: I2cDevice) -> Self {
        Device::I2c(dev)
    }
}

/// One board's complete peripheral set
///
/// A platform bundles concrete port types plus the static pinout table
/// that gives logical pin numbers their meaning on this board. The
/// shared-reference accessors (`gpio`, `counter`, `flash`) cover the
/// reads the contract layer performs on its interrupt-safe paths.
pub trait Platform {
    /// GPIO bank type
    type Gpio: GpioBank;

    /// Serial bank type
    type Serial: SerialBank;

    /// SPI bank type
    type Spi: SpiBank;

    /// I2C bank type
    type I2c: I2cBank;

    /// Flash array type
    type Flash: FlashPort;

    /// Free-running counter type
    type Counter: CounterPort;

    /// One-shot countdown type
    type Countdown: CountdownPort;

    /// Logical-to-physical pin table, indexed by logical pin number
    fn pinout(&self) -> &'static [PinDesc];

    fn gpio(&self) -> &Self::Gpio;
    fn gpio_mut(&mut self) -> &mut Self::Gpio;

    fn serial_mut(&mut self) -> &mut Self::Serial;

    fn spi_mut(&mut self) -> &mut Self::Spi;

    fn i2c_mut(&mut self) -> &mut Self::I2c;

    fn flash(&self) -> &Self::Flash;
    fn flash_mut(&mut self) -> &mut Self::Flash;

    fn counter(&self) -> &Self::Counter;

    fn countdown_mut(&mut self) -> &mut Self::Countdown;
}
