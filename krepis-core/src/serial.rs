//! Serial transmit pump and receive staging
//!
//! Transmit is pull-based: the interpreter queues bytes on its side and
//! kicks the pump, which drains the queue into the port until empty.
//! Nothing is buffered here, so there is no copy to keep coherent and a
//! redundant kick is harmless. Receive polling feeds the staging queue
//! in bounded chunks for ports without receive interrupts.

use heapless::Vec;
use krepis_hal::{SerialBank, SerialConfig, SerialDevice};

use crate::error::HalError;
use crate::event::{EventFlag, EventPayload, IoEvent, MAX_RX_CHUNK};

/// Interpreter-owned transmit queue, drained by the pump
pub trait TxSource {
    /// True while at least one byte is queued
    fn has_more_to_send(&self) -> bool;

    /// Take the next queued byte, `None` once empty
    fn next_byte(&mut self) -> Option<u8>;
}

/// Per-device serial state: configuration tracking and the pump itself
pub struct SerialPump {
    initialised: [bool; SerialDevice::COUNT],
}

impl SerialPump {
    pub const fn new() -> Self {
        Self {
            initialised: [false; SerialDevice::COUNT],
        }
    }

    /// Configure a device and mark it live
    pub fn setup<S: SerialBank>(
        &mut self,
        port: &mut S,
        dev: SerialDevice,
        config: &SerialConfig,
    ) -> Result<(), HalError> {
        port.configure(dev, config)?;
        self.initialised[dev.index()] = true;
        Ok(())
    }

    /// True once the device has been configured
    pub fn is_initialised(&self, dev: SerialDevice) -> bool {
        self.initialised[dev.index()]
    }

    /// Drain the interpreter's queue into the transmit FIFO
    ///
    /// A kick on a device that was never configured sets it up with the
    /// default wire format first, so early console output on a fresh
    /// board is not silently lost. Backpressure is the port's: a full
    /// FIFO blocks inside `write_byte`, never here.
    pub fn kick<S: SerialBank>(
        &mut self,
        port: &mut S,
        dev: SerialDevice,
        source: &mut dyn TxSource,
    ) -> Result<(), HalError> {
        if !source.has_more_to_send() {
            return Ok(());
        }
        if !self.is_initialised(dev) {
            self.setup(port, dev, &SerialConfig::default())?;
        }
        while let Some(byte) = source.next_byte() {
            port.write_byte(dev, byte);
        }
        Ok(())
    }

    /// Poll one device's receive FIFO into an event payload
    ///
    /// Returns up to [`MAX_RX_CHUNK`] bytes as one event, `None` when
    /// the FIFO was empty. Callers loop until `None` to drain bursts.
    pub fn poll_rx<S: SerialBank>(
        &mut self,
        port: &mut S,
        dev: SerialDevice,
    ) -> Option<IoEvent> {
        let mut bytes: Vec<u8, MAX_RX_CHUNK> = Vec::new();
        while bytes.len() < MAX_RX_CHUNK {
            match port.try_read_byte(dev) {
                Some(byte) => {
                    // capacity checked by the loop bound
                    let _ = bytes.push(byte);
                }
                None => break,
            }
        }
        if bytes.is_empty() {
            return None;
        }
        Some(IoEvent {
            flag: EventFlag::SerialRx(dev),
            payload: EventPayload::Bytes(bytes),
        })
    }

    /// Forget all device configuration (soft reset)
    pub fn reset(&mut self) {
        self.initialised = [false; SerialDevice::COUNT];
    }
}

impl Default for SerialPump {
    fn default() -> Self {
        Self::new()
    }
}
