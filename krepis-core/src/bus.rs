//! Synchronous bus transfers: SPI pipelining and blocking I2C
//!
//! The interpreter's SPI contract is pipelined one deep: sending a byte
//! returns the byte received during the *previous* transfer, and passing
//! no data collects the outstanding result. This mirrors hardware where
//! the response to a command arrives while the next command is clocked
//! out. The port below is a plain synchronous word transfer; the one-deep
//! delay line lives here.

use krepis_hal::{
    I2cBank, I2cConfig, I2cDevice, SpiBank, SpiConfig, SpiDevice,
};

use crate::error::HalError;

/// Per-device bus state: init tracking plus the SPI delay line
pub struct BusSet {
    spi_initialised: [bool; SpiDevice::COUNT],
    /// Response of the most recent transfer, not yet collected
    spi_pending: [Option<u8>; SpiDevice::COUNT],
    i2c_initialised: [bool; I2cDevice::COUNT],
}

impl BusSet {
    pub const fn new() -> Self {
        Self {
            spi_initialised: [false; SpiDevice::COUNT],
            spi_pending: [None; SpiDevice::COUNT],
            i2c_initialised: [false; I2cDevice::COUNT],
        }
    }

    /// Configure an SPI device and clear its delay line
    pub fn spi_setup<S: SpiBank>(
        &mut self,
        port: &mut S,
        dev: SpiDevice,
        config: &SpiConfig,
    ) -> Result<(), HalError> {
        port.configure(dev, config)?;
        self.spi_initialised[dev.index()] = true;
        self.spi_pending[dev.index()] = None;
        Ok(())
    }

    pub fn is_spi_initialised(&self, dev: SpiDevice) -> bool {
        self.spi_initialised[dev.index()]
    }

    /// Pipelined byte exchange
    ///
    /// `Some(byte)` clocks the byte out and returns the response of the
    /// previous transfer (`None` on the first send after setup or wait).
    /// `None` collects the outstanding response without clocking
    /// anything.
    pub fn spi_send<S: SpiBank>(
        &mut self,
        port: &mut S,
        dev: SpiDevice,
        data: Option<u8>,
    ) -> Result<Option<u8>, HalError> {
        if !self.is_spi_initialised(dev) {
            return Err(HalError::DeviceNotReady);
        }
        match data {
            Some(byte) => {
                let received = port.transfer_word(dev, byte);
                Ok(self.spi_pending[dev.index()].replace(received))
            }
            None => Ok(self.spi_pending[dev.index()].take()),
        }
    }

    /// Send one 16-bit word, most significant byte first
    ///
    /// Received data is discarded and the byte delay line is untouched,
    /// matching displays and DACs that are write-only at 16 bits.
    pub fn spi_send16<S: SpiBank>(
        &mut self,
        port: &mut S,
        dev: SpiDevice,
        word: u16,
    ) -> Result<(), HalError> {
        if !self.is_spi_initialised(dev) {
            return Err(HalError::DeviceNotReady);
        }
        port.transfer_word(dev, (word >> 8) as u8);
        port.transfer_word(dev, (word & 0xFF) as u8);
        Ok(())
    }

    /// Drain the delay line so a chip-select change sees a quiet bus
    pub fn spi_wait(&mut self, dev: SpiDevice) {
        self.spi_pending[dev.index()] = None;
    }

    /// Configure an I2C device
    pub fn i2c_setup<I: I2cBank>(
        &mut self,
        port: &mut I,
        dev: I2cDevice,
        config: &I2cConfig,
    ) -> Result<(), HalError> {
        port.configure(dev, config)?;
        self.i2c_initialised[dev.index()] = true;
        Ok(())
    }

    pub fn is_i2c_initialised(&self, dev: I2cDevice) -> bool {
        self.i2c_initialised[dev.index()]
    }

    /// Blocking I2C write; `send_stop == false` keeps the bus claimed
    pub fn i2c_write<I: I2cBank>(
        &mut self,
        port: &mut I,
        dev: I2cDevice,
        addr: u8,
        data: &[u8],
        send_stop: bool,
    ) -> Result<(), HalError> {
        if !self.is_i2c_initialised(dev) {
            return Err(HalError::DeviceNotReady);
        }
        port.write(dev, addr, data, send_stop)?;
        Ok(())
    }

    /// Blocking I2C read into `buf`
    pub fn i2c_read<I: I2cBank>(
        &mut self,
        port: &mut I,
        dev: I2cDevice,
        addr: u8,
        buf: &mut [u8],
        send_stop: bool,
    ) -> Result<(), HalError> {
        if !self.is_i2c_initialised(dev) {
            return Err(HalError::DeviceNotReady);
        }
        port.read(dev, addr, buf, send_stop)?;
        Ok(())
    }

    /// Forget all device state (soft reset)
    pub fn reset(&mut self) {
        self.spi_initialised = [false; SpiDevice::COUNT];
        self.spi_pending = [None; SpiDevice::COUNT];
        self.i2c_initialised = [false; I2cDevice::COUNT];
    }
}

impl Default for BusSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use krepis_hal::{BusError, PortError};
    use std::collections::VecDeque;

    /// SPI double with scripted responses
    #[derive(Default)]
    struct FakeSpi {
        sent: Vec<u8>,
        responses: VecDeque<u8>,
    }

    impl SpiBank for FakeSpi {
        fn configure(&mut self, _dev: SpiDevice, _config: &SpiConfig) -> Result<(), PortError> {
            Ok(())
        }

        fn transfer_word(&mut self, _dev: SpiDevice, word: u8) -> u8 {
            self.sent.push(word);
            self.responses.pop_front().unwrap_or(0)
        }
    }

    /// I2C double that records transactions and can refuse an address
    #[derive(Default)]
    struct FakeI2c {
        writes: Vec<(u8, Vec<u8>, bool)>,
        read_data: VecDeque<u8>,
        nack_addr: Option<u8>,
    }

    impl I2cBank for FakeI2c {
        fn configure(&mut self, _dev: I2cDevice, _config: &I2cConfig) -> Result<(), PortError> {
            Ok(())
        }

        fn write(
            &mut self,
            _dev: I2cDevice,
            addr: u8,
            data: &[u8],
            send_stop: bool,
        ) -> Result<(), BusError> {
            if self.nack_addr == Some(addr) {
                return Err(BusError::Nack);
            }
            self.writes.push((addr, data.to_vec(), send_stop));
            Ok(())
        }

        fn read(
            &mut self,
            _dev: I2cDevice,
            addr: u8,
            buf: &mut [u8],
            _send_stop: bool,
        ) -> Result<(), BusError> {
            if self.nack_addr == Some(addr) {
                return Err(BusError::Nack);
            }
            for slot in buf.iter_mut() {
                *slot = self.read_data.pop_front().unwrap_or(0xFF);
            }
            Ok(())
        }
    }

    fn spi_ready() -> (BusSet, FakeSpi) {
        let mut buses = BusSet::new();
        let mut port = FakeSpi::default();
        buses
            .spi_setup(&mut port, SpiDevice::Spi0, &SpiConfig::default())
            .unwrap();
        (buses, port)
    }

    #[test]
    fn test_spi_send_returns_previous_response() {
        let (mut buses, mut port) = spi_ready();
        port.responses.extend([0xA1, 0xB2]);

        // First send has nothing outstanding to return
        let first = buses
            .spi_send(&mut port, SpiDevice::Spi0, Some(0x10))
            .unwrap();
        assert_eq!(first, None);

        // Second send returns the first transfer's response
        let second = buses
            .spi_send(&mut port, SpiDevice::Spi0, Some(0x20))
            .unwrap();
        assert_eq!(second, Some(0xA1));

        // Collecting drains the delay line
        let collected = buses.spi_send(&mut port, SpiDevice::Spi0, None).unwrap();
        assert_eq!(collected, Some(0xB2));
        let empty = buses.spi_send(&mut port, SpiDevice::Spi0, None).unwrap();
        assert_eq!(empty, None);

        assert_eq!(port.sent, vec![0x10, 0x20]);
    }

    #[test]
    fn test_spi_wait_quiesces() {
        let (mut buses, mut port) = spi_ready();
        port.responses.extend([0x55]);

        buses
            .spi_send(&mut port, SpiDevice::Spi0, Some(0x01))
            .unwrap();
        buses.spi_wait(SpiDevice::Spi0);

        let after = buses.spi_send(&mut port, SpiDevice::Spi0, None).unwrap();
        assert_eq!(after, None);
    }

    #[test]
    fn test_spi_send16_bypasses_delay_line() {
        let (mut buses, mut port) = spi_ready();
        port.responses.extend([0xAA, 0x11, 0x22]);

        buses
            .spi_send(&mut port, SpiDevice::Spi0, Some(0x01))
            .unwrap();
        buses
            .spi_send16(&mut port, SpiDevice::Spi0, 0xBEEF)
            .unwrap();

        assert_eq!(port.sent, vec![0x01, 0xBE, 0xEF]);
        // Outstanding byte response survives the 16-bit write
        let pending = buses.spi_send(&mut port, SpiDevice::Spi0, None).unwrap();
        assert_eq!(pending, Some(0xAA));
    }

    #[test]
    fn test_spi_requires_setup() {
        let mut buses = BusSet::new();
        let mut port = FakeSpi::default();
        assert_eq!(
            buses
                .spi_send(&mut port, SpiDevice::Spi1, Some(0x00))
                .err(),
            Some(HalError::DeviceNotReady)
        );
        assert_eq!(
            buses.spi_send16(&mut port, SpiDevice::Spi1, 0).err(),
            Some(HalError::DeviceNotReady)
        );
    }

    #[test]
    fn test_setup_clears_stale_pending() {
        let (mut buses, mut port) = spi_ready();
        port.responses.extend([0x42]);
        buses
            .spi_send(&mut port, SpiDevice::Spi0, Some(0x01))
            .unwrap();

        buses
            .spi_setup(&mut port, SpiDevice::Spi0, &SpiConfig::default())
            .unwrap();
        let after = buses.spi_send(&mut port, SpiDevice::Spi0, None).unwrap();
        assert_eq!(after, None);
    }

    #[test]
    fn test_i2c_write_read_with_stop_control() {
        let mut buses = BusSet::new();
        let mut port = FakeI2c::default();
        buses
            .i2c_setup(&mut port, I2cDevice::I2c0, &I2cConfig::STANDARD)
            .unwrap();

        // Register write without stop, then the data read with stop
        buses
            .i2c_write(&mut port, I2cDevice::I2c0, 0x3C, &[0x07], false)
            .unwrap();
        port.read_data.extend([1, 2, 3]);
        let mut buf = [0u8; 3];
        buses
            .i2c_read(&mut port, I2cDevice::I2c0, 0x3C, &mut buf, true)
            .unwrap();

        assert_eq!(port.writes, vec![(0x3C, vec![0x07], false)]);
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn test_i2c_nack_surfaces_as_bus_error() {
        let mut buses = BusSet::new();
        let mut port = FakeI2c {
            nack_addr: Some(0x50),
            ..Default::default()
        };
        buses
            .i2c_setup(&mut port, I2cDevice::I2c0, &I2cConfig::default())
            .unwrap();

        assert_eq!(
            buses
                .i2c_write(&mut port, I2cDevice::I2c0, 0x50, &[0x00], true)
                .err(),
            Some(HalError::Bus(BusError::Nack))
        );
    }

    #[test]
    fn test_i2c_requires_setup() {
        let mut buses = BusSet::new();
        let mut port = FakeI2c::default();
        let mut buf = [0u8; 1];
        assert_eq!(
            buses
                .i2c_read(&mut port, I2cDevice::I2c1, 0x10, &mut buf, true)
                .err(),
            Some(HalError::DeviceNotReady)
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut buses, mut port) = spi_ready();
        port.responses.extend([0x99]);
        buses
            .spi_send(&mut port, SpiDevice::Spi0, Some(0x01))
            .unwrap();

        buses.reset();
        assert!(!buses.is_spi_initialised(SpiDevice::Spi0));
        assert_eq!(
            buses.spi_send(&mut port, SpiDevice::Spi0, None).err(),
            Some(HalError::DeviceNotReady)
        );
    }
}
