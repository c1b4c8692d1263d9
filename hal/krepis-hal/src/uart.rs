//! Serial (UART) bank abstraction
//!
//! Blocking byte-level access to the chip's UARTs, indexed by device.
//! The transmit path is pull-based: the contract layer drains the
//! interpreter's queue into `write_byte`, which applies FIFO
//! backpressure by blocking until space is available.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gpio::PortError;
use crate::pin::PhysicalPin;

/// Serial device identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SerialDevice {
    Serial0,
    Serial1,
}

impl SerialDevice {
    pub const COUNT: usize = 2;
    pub const ALL: [SerialDevice; Self::COUNT] = [SerialDevice::Serial0, SerialDevice::Serial1];

    pub const fn index(self) -> usize {
        match self {
            SerialDevice::Serial0 => 0,
            SerialDevice::Serial1 => 1,
        }
    }
}

/// Serial port configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// TX line routing; `None` keeps the board default
    pub tx_pin: Option<PhysicalPin>,
    /// RX line routing; `None` keeps the board default
    pub rx_pin: Option<PhysicalPin>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            tx_pin: None,
            rx_pin: None,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopBits {
    One,
    Two,
}

/// Byte-level access to the serial devices of one chip
pub trait SerialBank {
    /// Configure a device, claiming its routed pins
    fn configure(&mut self, dev: SerialDevice, config: &SerialConfig) -> Result<(), PortError>;

    /// Push one byte into the transmit FIFO
    ///
    /// Blocks while the FIFO is full. Normal context only.
    fn write_byte(&mut self, dev: SerialDevice, byte: u8);

    /// Pop one received byte, `None` when the receive FIFO is empty
    fn try_read_byte(&mut self, dev: SerialDevice) -> Option<u8>;
}
