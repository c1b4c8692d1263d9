//! In-memory serial bank

use std::collections::VecDeque;

use krepis_hal::{PortError, SerialBank, SerialConfig, SerialDevice};

/// Serial bank with unbounded FIFOs
///
/// Transmitted bytes accumulate per device for inspection; received
/// bytes are injected with [`SimSerial::queue_rx`]. Nothing ever
/// blocks.
#[derive(Debug, Default)]
pub struct SimSerial {
    configs: [Option<SerialConfig>; SerialDevice::COUNT],
    tx: [Vec<u8>; SerialDevice::COUNT],
    rx: [VecDeque<u8>; SerialDevice::COUNT],
}

impl SimSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make bytes available on a device's receive side
    pub fn queue_rx(&mut self, dev: SerialDevice, bytes: &[u8]) {
        self.rx[dev.index()].extend(bytes.iter().copied());
    }

    /// Everything written to a device since construction
    pub fn transmitted(&self, dev: SerialDevice) -> &[u8] {
        &self.tx[dev.index()]
    }

    /// Last configuration applied to a device
    pub fn config_of(&self, dev: SerialDevice) -> Option<SerialConfig> {
        self.configs[dev.index()]
    }
}

impl SerialBank for SimSerial {
    fn configure(&mut self, dev: SerialDevice, config: &SerialConfig) -> Result<(), PortError> {
        self.configs[dev.index()] = Some(*config);
        Ok(())
    }

    fn write_byte(&mut self, dev: SerialDevice, byte: u8) {
        self.tx[dev.index()].push(byte);
    }

    fn try_read_byte(&mut self, dev: SerialDevice) -> Option<u8> {
        self.rx[dev.index()].pop_front()
    }
}
