//! In-memory SPI bank

use std::collections::VecDeque;

use krepis_hal::{PortError, SpiBank, SpiConfig, SpiDevice};

/// SPI bank that logs outgoing words and replays scripted responses
///
/// Each transfer pops the next scripted response byte; with nothing
/// scripted the slave reads as 0x00.
#[derive(Debug, Default)]
pub struct SimSpi {
    configs: [Option<SpiConfig>; SpiDevice::COUNT],
    sent: [Vec<u8>; SpiDevice::COUNT],
    responses: [VecDeque<u8>; SpiDevice::COUNT],
}

impl SimSpi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script what the slave answers on upcoming transfers
    pub fn script_responses(&mut self, dev: SpiDevice, bytes: &[u8]) {
        self.responses[dev.index()].extend(bytes.iter().copied());
    }

    /// Every word clocked out on a device, in order
    pub fn sent(&self, dev: SpiDevice) -> &[u8] {
        &self.sent[dev.index()]
    }

    /// Last configuration applied to a device
    pub fn config_of(&self, dev: SpiDevice) -> Option<SpiConfig> {
        self.configs[dev.index()]
    }
}

impl SpiBank for SimSpi {
    fn configure(&mut self, dev: SpiDevice, config: &SpiConfig) -> Result<(), PortError> {
        self.configs[dev.index()] = Some(*config);
        Ok(())
    }

    fn transfer_word(&mut self, dev: SpiDevice, word: u8) -> u8 {
        self.sent[dev.index()].push(word);
        self.responses[dev.index()].pop_front().unwrap_or(0)
    }
}
