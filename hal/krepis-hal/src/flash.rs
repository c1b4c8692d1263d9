//! Flash memory abstraction
//!
//! A raw byte-addressable view of the chip's flash array, organized in
//! erase pages. Alignment and bounds policy is enforced above this trait;
//! implementations only need honest page geometry and the three physical
//! operations.

/// Errors from flash operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Address range falls outside the flash array
    OutOfBounds,
    /// Address or length violates the device's alignment rules
    Unaligned,
    /// The flash controller reported a failure
    Fault,
}

/// Geometry of one erase page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashPage {
    /// First address of the page
    pub start: u32,
    /// Page length in bytes
    pub size: u32,
}

impl FlashPage {
    /// True when `addr` falls inside this page
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr - self.start < self.size
    }
}

/// Byte-addressable flash access
pub trait FlashPort {
    /// Total size of the array in bytes
    fn capacity(&self) -> u32;

    /// Copy bytes out of flash starting at `addr`
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), FlashError>;

    /// Program bytes starting at `addr`
    ///
    /// NOR semantics: programming can only clear bits, so callers erase
    /// the containing page first for arbitrary data.
    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashError>;

    /// Erase the page containing `addr` back to all-ones
    fn erase_page(&mut self, addr: u32) -> Result<(), FlashError>;

    /// Geometry of the page containing `addr`, `None` past the end
    fn page_at(&self, addr: u32) -> Option<FlashPage>;
}
