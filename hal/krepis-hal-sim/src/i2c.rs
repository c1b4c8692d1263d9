//! In-memory I2C bank

use std::collections::VecDeque;

use krepis_hal::{BusError, I2cBank, I2cConfig, I2cDevice, PortError};

/// I2C bank that logs write transactions and replays scripted reads
///
/// One address can be marked absent with [`SimI2c::nack_address`];
/// transactions against it fail the way a missing slave would. Reads
/// past the scripted data return 0xFF, the idle-bus level.
#[derive(Debug, Default)]
pub struct SimI2c {
    configs: [Option<I2cConfig>; I2cDevice::COUNT],
    writes: [Vec<(u8, Vec<u8>, bool)>; I2cDevice::COUNT],
    read_data: [VecDeque<u8>; I2cDevice::COUNT],
    nack: Option<u8>,
}

impl SimI2c {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script what the slave answers on upcoming reads
    pub fn set_read_data(&mut self, dev: I2cDevice, bytes: &[u8]) {
        self.read_data[dev.index()].extend(bytes.iter().copied());
    }

    /// Make transactions against `addr` fail with a NACK
    pub fn nack_address(&mut self, addr: u8) {
        self.nack = Some(addr);
    }

    /// Logged write transactions: (address, data, stop sent)
    pub fn writes(&self, dev: I2cDevice) -> &[(u8, Vec<u8>, bool)] {
        &self.writes[dev.index()]
    }

    /// Last configuration applied to a device
    pub fn config_of(&self, dev: I2cDevice) -> Option<I2cConfig> {
        self.configs[dev.index()]
    }

    fn check_addr(&self, addr: u8) -> Result<(), BusError> {
        if self.nack == Some(addr) {
            return Err(BusError::Nack);
        }
        Ok(())
    }
}

impl I2cBank for SimI2c {
    fn configure(&mut self, dev: I2cDevice, config: &I2cConfig) -> Result<(), PortError> {
        self.configs[dev.index()] = Some(*config);
        Ok(())
    }

    fn write(
        &mut self,
        dev: I2cDevice,
        addr: u8,
        data: &[u8],
        send_stop: bool,
    ) -> Result<(), BusError> {
        self.check_addr(addr)?;
        self.writes[dev.index()].push((addr, data.to_vec(), send_stop));
        Ok(())
    }

    fn read(
        &mut self,
        dev: I2cDevice,
        addr: u8,
        buf: &mut [u8],
        _send_stop: bool,
    ) -> Result<(), BusError> {
        self.check_addr(addr)?;
        for slot in buf.iter_mut() {
            *slot = self.read_data[dev.index()].pop_front().unwrap_or(0xFF);
        }
        Ok(())
    }
}
