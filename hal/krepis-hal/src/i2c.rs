//! I2C bank abstraction
//!
//! Blocking master transactions with explicit stop control, so callers
//! can chain write-then-read sequences with a repeated start.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gpio::PortError;
use crate::pin::PhysicalPin;

/// I2C device identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum I2cDevice {
    I2c0,
    I2c1,
}

impl I2cDevice {
    pub const COUNT: usize = 2;
    pub const ALL: [I2cDevice; Self::COUNT] = [I2cDevice::I2c0, I2cDevice::I2c1];

    pub const fn index(self) -> usize {
        match self {
            I2cDevice::I2c0 => 0,
            I2cDevice::I2c1 => 1,
        }
    }
}

/// Bus-level failure of an I2C transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// Address or data byte not acknowledged
    Nack,
    /// Lost arbitration to another master
    ArbitrationLost,
    /// Bus stuck or peripheral fault
    Fault,
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// SCL routing; `None` keeps the board default
    pub scl_pin: Option<PhysicalPin>,
    /// SDA routing; `None` keeps the board default
    pub sda_pin: Option<PhysicalPin>,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            frequency: 100_000, // 100 kHz standard mode
            scl_pin: None,
            sda_pin: None,
        }
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        frequency: 100_000,
        scl_pin: None,
        sda_pin: None,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        frequency: 400_000,
        scl_pin: None,
        sda_pin: None,
    };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self {
        frequency: 1_000_000,
        scl_pin: None,
        sda_pin: None,
    };
}

/// Master access to the I2C devices of one chip
///
/// Addresses are plain 7-bit; implementations handle the read/write bit.
pub trait I2cBank {
    /// Configure a device, claiming its routed pins
    fn configure(&mut self, dev: I2cDevice, config: &I2cConfig) -> Result<(), PortError>;

    /// Write bytes to a device
    ///
    /// With `send_stop == false` the bus stays claimed and the next
    /// transaction begins with a repeated start.
    fn write(
        &mut self,
        dev: I2cDevice,
        addr: u8,
        data: &[u8],
        send_stop: bool,
    ) -> Result<(), BusError>;

    /// Read bytes from a device into `buf`
    fn read(
        &mut self,
        dev: I2cDevice,
        addr: u8,
        buf: &mut [u8],
        send_stop: bool,
    ) -> Result<(), BusError>;
}
