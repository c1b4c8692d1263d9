//! The board context: every interpreter-facing operation in one place
//!
//! [`Board`] owns the platform's ports plus all contract state (pin
//! registry, watch table, staging queue, deferred timer, clock, bus
//! pipelines) and exposes the operations the interpreter calls. Two
//! execution contexts meet here:
//!
//! - Normal context uses the `&mut self` operations and may block
//!   (bus transfers, serial backpressure, busy-wait delays).
//! - Interrupt context uses the `&self` entries (`on_pin_edge`,
//!   `on_timer_fire`, `on_serial_rx`, plus the reads `pin_get_value`,
//!   `watched_pin_state` and `now_us`). These never allocate, never
//!   block, and touch shared state only through short critical
//!   sections, so they are safe to call with interrupts disabled.
//!
//! Interrupt glue and the main loop must share the board under the
//! system's usual critical-section discipline, for example a blocking
//! mutex around the board with the `&self` subset invoked from the
//! handler's borrow.

use krepis_hal::{
    Device, FlashPage, GpioBank, I2cConfig, I2cDevice, PhysicalPin, Pin, PinCaps, PinState,
    Platform, SerialConfig, SerialDevice, SpiConfig, SpiDevice,
};

use crate::bus::BusSet;
use crate::clock::{self, SystemClock};
use crate::diag::{DiagSnapshot, Diagnostics, Fault};
use crate::error::HalError;
use crate::event::{EventFlag, EventPayload, EventSink, IoEvent, MAX_RX_CHUNK};
use crate::flash;
use crate::pins::PinRegistry;
use crate::queue::EventQueue;
use crate::serial::{SerialPump, TxSource};
use crate::timer::{DeferredTimer, TimerState};
use crate::watch::WatchTable;

/// Called when the deferred timer fires with a deadline armed
///
/// The hook runs in interrupt context and must only flag the scheduler
/// awake (set an atomic, signal an executor), never do work.
pub trait WakeHook {
    fn wake(&self);
}

/// Hook for boards whose scheduler polls instead of sleeping
pub struct NullWake;

impl WakeHook for NullWake {
    fn wake(&self) {}
}

/// One board: platform ports plus all contract state
pub struct Board<P: Platform, W: WakeHook = NullWake> {
    platform: P,
    wake: W,
    registry: PinRegistry,
    watches: WatchTable,
    queue: EventQueue,
    timer: DeferredTimer,
    clock: SystemClock,
    pump: SerialPump,
    buses: BusSet,
    diag: Diagnostics,
}

impl<P: Platform, W: WakeHook> Board<P, W> {
    /// Bring up the contract layer over a platform
    ///
    /// Validates the pinout table against the GPIO bank before anything
    /// else runs; a board with a broken table never comes up half-alive.
    pub fn new(platform: P, wake: W) -> Result<Self, HalError> {
        let registry = PinRegistry::new(platform.pinout(), P::Gpio::PIN_COUNT)?;
        Ok(Self {
            platform,
            wake,
            registry,
            watches: WatchTable::new(),
            queue: EventQueue::new(),
            timer: DeferredTimer::new(),
            clock: SystemClock::new(),
            pump: SerialPump::new(),
            buses: BusSet::new(),
            diag: Diagnostics::new(),
        })
    }

    /// Soft reset: back to the boot state, clock excepted
    ///
    /// Pin modes return to `Undefined`, watches disarm, the deferred
    /// timer cancels, staged events vanish, SPI delay lines drain and
    /// every device forgets its configuration. The monotonic clock keeps
    /// counting; electrical pin state is left for the interpreter to
    /// reconfigure on demand.
    pub fn reset(&mut self) {
        for phys in self.watches.drain() {
            self.platform.gpio_mut().set_edge_detect(phys, false);
        }
        self.timer.disable(self.platform.countdown_mut());
        self.queue.clear();
        self.registry.reset();
        self.pump.reset();
        self.buses.reset();
    }

    // --- pin state machine -------------------------------------------------

    /// Move a pin into an electrical mode
    ///
    /// The request is validated against the pinout capabilities first;
    /// on any failure the previous mode stays in force. Exactly one port
    /// configure call happens per successful invocation.
    pub fn pin_set_state(&mut self, pin: Pin, state: PinState) -> Result<(), HalError> {
        let phys = self.registry.validate_for_state(pin, state)?.phys;
        self.platform
            .gpio_mut()
            .configure(phys, state)
            .map_err(|_| HalError::UnsupportedPinState)?;
        self.registry.record_state(pin, state);
        Ok(())
    }

    /// Last successfully set mode; `Undefined` for unknown pins
    pub fn pin_get_state(&self, pin: Pin) -> PinState {
        if self.registry.lookup(pin).is_err() {
            self.diag.note(Fault::UnknownPin);
            return PinState::Undefined;
        }
        self.registry.state_of(pin)
    }

    /// Drive an output pin
    pub fn pin_set_value(&mut self, pin: Pin, high: bool) -> Result<(), HalError> {
        let phys = self.registry.phys(pin)?;
        if !self.registry.state_of(pin).is_output() {
            return Err(HalError::InvalidPinOperation);
        }
        self.platform.gpio_mut().write(phys, high);
        Ok(())
    }

    /// Read a pin's digital level
    ///
    /// Interrupt-safe. Defined for input and output modes; anything else
    /// reads as a benign `false` and bumps a diagnostic counter.
    pub fn pin_get_value(&self, pin: Pin) -> bool {
        match self.registry.phys(pin) {
            Ok(phys) if self.registry.state_of(pin).is_readable() => {
                self.platform.gpio().read(phys)
            }
            Ok(_) => {
                self.diag.note(Fault::InvalidPinOp);
                false
            }
            Err(_) => {
                self.diag.note(Fault::UnknownPin);
                false
            }
        }
    }

    // --- event watches -----------------------------------------------------

    /// Whether the pin's line supports edge detection at all
    pub fn can_watch(&self, pin: Pin) -> bool {
        self.registry
            .lookup(pin)
            .map(|desc| desc.caps.contains(PinCaps::WATCH))
            .unwrap_or(false)
    }

    /// Start or stop watching a pin for edges
    ///
    /// Enabling returns the pin's event flag; while the pin stays
    /// watched, repeated enables return the same flag. Disabling disarms
    /// the line and frees the slot; events still staged under the freed
    /// flag are discarded so a later watch reusing the slot never sees
    /// them. Returns `Ok(None)`.
    pub fn pin_watch(&mut self, pin: Pin, enable: bool) -> Result<Option<EventFlag>, HalError> {
        let desc = self.registry.lookup(pin)?;
        let (phys, caps) = (desc.phys, desc.caps);
        if enable {
            if !caps.contains(PinCaps::WATCH) {
                return Err(HalError::InvalidPinOperation);
            }
            let flag = self.watches.attach(pin, phys)?;
            self.platform.gpio_mut().set_edge_detect(phys, true);
            Ok(Some(flag))
        } else {
            let freed = self.watches.flag_for(pin);
            if let Some(phys) = self.watches.detach(pin) {
                self.platform.gpio_mut().set_edge_detect(phys, false);
            }
            // Purge after the detach: once the slot is free nothing can
            // restage under this flag, so the sweep is complete.
            if let Some(flag) = freed {
                self.queue.purge(flag);
            }
            Ok(None)
        }
    }

    /// Does this staged event belong to this pin?
    pub fn is_event_for_pin(&self, event: &IoEvent, pin: Pin) -> bool {
        match self.watches.flag_for(pin) {
            Some(flag) => flag == event.flag,
            None => false,
        }
    }

    /// Current level of the line behind a watch flag
    ///
    /// Interrupt-safe; a stale or non-edge flag reads as `false`.
    pub fn watched_pin_state(&self, flag: EventFlag) -> bool {
        match self.watches.phys_for_flag(flag) {
            Some(phys) => self.platform.gpio().read(phys),
            None => false,
        }
    }

    /// Edge interrupt entry: stage an event for a watched line
    ///
    /// An edge on an unwatched line is spurious and only counted. When
    /// the staging queue is full the oldest record is discarded so this
    /// path never blocks the handler.
    pub fn on_pin_edge(&self, phys: PhysicalPin, level: bool) {
        let Some(flag) = self.watches.flag_for_phys(phys) else {
            self.diag.note(Fault::SpuriousEvent);
            return;
        };
        let at_us = self.clock.now_us(self.platform.counter());
        let event = IoEvent {
            flag,
            payload: EventPayload::Edge { at_us, level },
        };
        if self.queue.push(event) {
            self.diag.note(Fault::DroppedEvent);
        }
    }

    /// Drain staged events into the interpreter's sink
    ///
    /// A flag that no longer maps to a watched line is discarded here
    /// as a last check, so the interpreter never sees a flag it does
    /// not own. Returns the number delivered.
    pub fn poll_events(&mut self, sink: &mut dyn EventSink) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.queue.pop() {
            if matches!(event.flag, EventFlag::Edge(_))
                && self.watches.phys_for_flag(event.flag).is_none()
            {
                self.diag.note(Fault::SpuriousEvent);
                continue;
            }
            sink.deliver(event);
            delivered += 1;
        }
        delivered
    }

    // --- deferred timer ----------------------------------------------------

    /// Arm the countdown `period_us` from now; errors if already armed
    pub fn timer_start(&mut self, period_us: i64) -> Result<(), HalError> {
        let now = self.clock.now_us(self.platform.counter());
        self.timer
            .start(self.platform.countdown_mut(), period_us, now)
    }

    /// Disarm the countdown; always legal, idempotent
    pub fn timer_disable(&mut self) {
        self.timer.disable(self.platform.countdown_mut());
    }

    /// Replace the current deadline with a new one
    pub fn timer_reschedule(&mut self, period_us: i64) {
        let now = self.clock.now_us(self.platform.counter());
        self.timer
            .reschedule(self.platform.countdown_mut(), period_us, now);
    }

    /// Countdown interrupt entry
    ///
    /// Wakes the scheduler exactly once per armed deadline; a fire with
    /// nothing armed is swallowed and counted.
    pub fn on_timer_fire(&self) {
        if self.timer.fire() {
            self.wake.wake();
        } else {
            self.diag.note(Fault::SpuriousEvent);
        }
    }

    /// Armed/disabled state of the deferred timer
    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    // --- clock -------------------------------------------------------------

    /// Monotonic microseconds since boot; interrupt-safe
    pub fn now_us(&self) -> u64 {
        self.clock.now_us(self.platform.counter())
    }

    /// Wall-clock time in microseconds
    pub fn system_time_us(&self) -> i64 {
        self.clock.system_time_us(self.platform.counter())
    }

    /// Set the wall clock without disturbing the monotonic base
    pub fn set_system_time(&self, t_us: i64) {
        self.clock.set_system_time(self.platform.counter(), t_us);
    }

    /// Busy-wait for `us` microseconds
    pub fn delay_us(&self, us: u64) {
        self.clock.delay_us(self.platform.counter(), us);
    }

    // --- serial ------------------------------------------------------------

    /// Configure a serial device and record its claimed pins
    pub fn serial_setup(
        &mut self,
        dev: SerialDevice,
        config: &SerialConfig,
    ) -> Result<(), HalError> {
        self.pump.setup(self.platform.serial_mut(), dev, config)?;
        self.note_claimed(config.tx_pin);
        self.note_claimed(config.rx_pin);
        Ok(())
    }

    /// Drain the interpreter's transmit queue into a device
    ///
    /// A device that was never configured gets the default wire format
    /// on first kick.
    pub fn serial_kick(
        &mut self,
        dev: SerialDevice,
        source: &mut dyn TxSource,
    ) -> Result<(), HalError> {
        self.pump.kick(self.platform.serial_mut(), dev, source)
    }

    /// Receive interrupt entry: stage bytes that arrived on a device
    ///
    /// Long bursts are chunked into several events.
    pub fn on_serial_rx(&self, dev: SerialDevice, bytes: &[u8]) {
        for chunk in bytes.chunks(MAX_RX_CHUNK) {
            let mut payload: heapless::Vec<u8, MAX_RX_CHUNK> = heapless::Vec::new();
            // chunk length is bounded by the vector capacity
            let _ = payload.extend_from_slice(chunk);
            let event = IoEvent {
                flag: EventFlag::SerialRx(dev),
                payload: EventPayload::Bytes(payload),
            };
            if self.queue.push(event) {
                self.diag.note(Fault::DroppedEvent);
            }
        }
    }

    /// Normal-context housekeeping: poll receive FIFOs into the queue
    ///
    /// For ports without receive interrupts. Returns `true` when any
    /// event was staged, so callers can skip sleeping.
    pub fn idle(&mut self) -> bool {
        let mut staged = false;
        for dev in SerialDevice::ALL {
            if !self.pump.is_initialised(dev) {
                continue;
            }
            while let Some(event) = self.pump.poll_rx(self.platform.serial_mut(), dev) {
                if self.queue.push(event) {
                    self.diag.note(Fault::DroppedEvent);
                }
                staged = true;
            }
        }
        staged
    }

    /// Has this device been configured since boot or reset?
    pub fn is_device_initialised(&self, dev: Device) -> bool {
        match dev {
            Device::Serial(dev) => self.pump.is_initialised(dev),
            Device::Spi(dev) => self.buses.is_spi_initialised(dev),
            Device::I2c(dev) => self.buses.is_i2c_initialised(dev),
        }
    }

    // --- buses -------------------------------------------------------------

    /// Configure an SPI device and record its claimed pins
    pub fn spi_setup(&mut self, dev: SpiDevice, config: &SpiConfig) -> Result<(), HalError> {
        self.buses.spi_setup(self.platform.spi_mut(), dev, config)?;
        self.note_claimed(config.sck_pin);
        self.note_claimed(config.mosi_pin);
        self.note_claimed(config.miso_pin);
        Ok(())
    }

    /// Pipelined SPI byte exchange
    ///
    /// `Some(byte)` sends and returns the previous transfer's response;
    /// `None` collects the outstanding response.
    pub fn spi_send(&mut self, dev: SpiDevice, data: Option<u8>) -> Result<Option<u8>, HalError> {
        self.buses.spi_send(self.platform.spi_mut(), dev, data)
    }

    /// Send one 16-bit word, receive data discarded
    pub fn spi_send16(&mut self, dev: SpiDevice, word: u16) -> Result<(), HalError> {
        self.buses.spi_send16(self.platform.spi_mut(), dev, word)
    }

    /// Drain the SPI delay line before toggling chip select
    pub fn spi_wait(&mut self, dev: SpiDevice) {
        self.buses.spi_wait(dev);
    }

    /// Configure an I2C device and record its claimed pins
    pub fn i2c_setup(&mut self, dev: I2cDevice, config: &I2cConfig) -> Result<(), HalError> {
        self.buses.i2c_setup(self.platform.i2c_mut(), dev, config)?;
        self.note_claimed(config.scl_pin);
        self.note_claimed(config.sda_pin);
        Ok(())
    }

    /// Blocking I2C write; bus faults come back as errors, never panics
    pub fn i2c_write(
        &mut self,
        dev: I2cDevice,
        addr: u8,
        data: &[u8],
        send_stop: bool,
    ) -> Result<(), HalError> {
        self.buses
            .i2c_write(self.platform.i2c_mut(), dev, addr, data, send_stop)
    }

    /// Blocking I2C read into `buf`
    pub fn i2c_read(
        &mut self,
        dev: I2cDevice,
        addr: u8,
        buf: &mut [u8],
        send_stop: bool,
    ) -> Result<(), HalError> {
        self.buses
            .i2c_read(self.platform.i2c_mut(), dev, addr, buf, send_stop)
    }

    // --- flash -------------------------------------------------------------

    /// Copy bytes out of flash
    pub fn flash_read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), HalError> {
        flash::read(self.platform.flash_mut(), addr, buf)
    }

    /// Program word-aligned bytes into flash
    pub fn flash_write(&mut self, addr: u32, data: &[u8]) -> Result<(), HalError> {
        flash::write(self.platform.flash_mut(), addr, data)
    }

    /// Erase the page containing `addr`
    pub fn flash_erase_page(&mut self, addr: u32) -> Result<(), HalError> {
        flash::erase_page(self.platform.flash_mut(), addr)
    }

    /// Geometry of the page containing `addr`
    pub fn flash_page_info(&self, addr: u32) -> Option<FlashPage> {
        flash::page_info(self.platform.flash(), addr)
    }

    // --- analog and pulse --------------------------------------------------

    /// Sample an analog input as 0.0..=1.0
    ///
    /// Auto-configures the pin for analog input on first use. Fail-soft:
    /// a pin that cannot do analog reads as 0.0 with a counter bump.
    pub fn pin_analog(&mut self, pin: Pin) -> f32 {
        let Ok(phys) = self.registry.phys(pin) else {
            self.diag.note(Fault::UnknownPin);
            return 0.0;
        };
        if self.registry.state_of(pin) != PinState::AnalogIn
            && self.pin_set_state(pin, PinState::AnalogIn).is_err()
        {
            self.diag.note(Fault::UnsupportedState);
            return 0.0;
        }
        let raw = self.platform.gpio_mut().read_analog(phys);
        f32::from(raw) / 4095.0
    }

    /// Drive an analog output with 0.0..=1.0, clamped
    ///
    /// Auto-configures the pin for analog output on first use.
    pub fn pin_analog_output(&mut self, pin: Pin, value: f32) -> Result<(), HalError> {
        if self.registry.state_of(pin) != PinState::AnalogOut {
            self.pin_set_state(pin, PinState::AnalogOut)?;
        }
        let phys = self.registry.phys(pin)?;
        let duty = (value.clamp(0.0, 1.0) * 65535.0) as u16;
        self.platform.gpio_mut().write_analog(phys, duty);
        Ok(())
    }

    /// Drive a pin to `polarity` for `time_ms`, then back
    ///
    /// Auto-configures the pin as a push-pull output first if needed.
    /// Blocks for the duration.
    pub fn pin_pulse(&mut self, pin: Pin, polarity: bool, time_ms: f64) -> Result<(), HalError> {
        if !self.registry.state_of(pin).is_output() {
            self.pin_set_state(pin, PinState::Output)?;
        }
        self.pin_set_value(pin, polarity)?;
        let us = clock::from_millis(time_ms).max(0) as u64;
        self.clock.delay_us(self.platform.counter(), us);
        self.pin_set_value(pin, !polarity)
    }

    // --- introspection -----------------------------------------------------

    /// Counters of everything absorbed by the fail-soft policy
    pub fn diagnostics(&self) -> DiagSnapshot {
        self.diag.snapshot()
    }

    /// Direct access to the platform, mostly for tests and bring-up glue
    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Record pins a peripheral claimed during setup
    fn note_claimed(&mut self, phys: Option<PhysicalPin>) {
        if let Some(phys) = phys {
            if let Some(pin) = self.registry.logical_for(phys) {
                self.registry.record_state(pin, PinState::Alternate);
            }
        }
    }
}
