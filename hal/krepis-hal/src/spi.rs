//! SPI bank abstraction
//!
//! Word-at-a-time master access to the chip's SPI blocks. The
//! return-previous pipelining the interpreter expects is built above
//! this trait; ports only need a synchronous full-duplex word transfer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::gpio::PortError;
use crate::pin::PhysicalPin;

/// SPI device identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpiDevice {
    Spi0,
    Spi1,
}

impl SpiDevice {
    pub const COUNT: usize = 2;
    pub const ALL: [SpiDevice; Self::COUNT] = [SpiDevice::Spi0, SpiDevice::Spi1];

    pub const fn index(self) -> usize {
        match self {
            SpiDevice::Spi0 => 0,
            SpiDevice::Spi1 => 1,
        }
    }
}

/// SPI configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity
    pub polarity: Polarity,
    /// Clock phase
    pub phase: Phase,
    /// SCK routing; `None` keeps the board default
    pub sck_pin: Option<PhysicalPin>,
    /// MOSI routing; `None` keeps the board default
    pub mosi_pin: Option<PhysicalPin>,
    /// MISO routing; `None` keeps the board default
    pub miso_pin: Option<PhysicalPin>,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 1_000_000, // 1 MHz
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
            sck_pin: None,
            mosi_pin: None,
            miso_pin: None,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}

/// Master access to the SPI devices of one chip
pub trait SpiBank {
    /// Configure a device, claiming its routed pins
    fn configure(&mut self, dev: SpiDevice, config: &SpiConfig) -> Result<(), PortError>;

    /// Clock one word out and return the word clocked in
    ///
    /// Completes the transfer before returning. Normal context only.
    fn transfer_word(&mut self, dev: SpiDevice, word: u8) -> u8;
}
