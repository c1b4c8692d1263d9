//! In-memory flash array

use krepis_hal::{FlashError, FlashPage, FlashPort};

/// Page size of the simulated array in bytes
pub const SIM_FLASH_PAGE: u32 = 4096;

/// Number of pages in the simulated array
pub const SIM_FLASH_PAGES: u32 = 16;

/// Flash array with NOR programming semantics
///
/// Writes AND bytes into the array, erases fill a page with 0xFF, so
/// the program-after-erase discipline is observable in tests. Erased
/// page addresses are logged in order.
#[derive(Debug)]
pub struct SimFlash {
    mem: Vec<u8>,
    erases: Vec<u32>,
}

impl SimFlash {
    pub fn new() -> Self {
        Self {
            mem: vec![0xFF; (SIM_FLASH_PAGE * SIM_FLASH_PAGES) as usize],
            erases: Vec::new(),
        }
    }

    /// Start addresses of every page erased, in order
    pub fn erased_pages(&self) -> &[u32] {
        &self.erases
    }

    fn span(&self, addr: u32, len: usize) -> Result<core::ops::Range<usize>, FlashError> {
        let start = addr as usize;
        let end = start.checked_add(len).ok_or(FlashError::OutOfBounds)?;
        if end > self.mem.len() {
            return Err(FlashError::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl Default for SimFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashPort for SimFlash {
    fn capacity(&self) -> u32 {
        self.mem.len() as u32
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        let span = self.span(addr, buf.len())?;
        buf.copy_from_slice(&self.mem[span]);
        Ok(())
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashError> {
        let span = self.span(addr, data.len())?;
        for (slot, byte) in self.mem[span].iter_mut().zip(data) {
            *slot &= byte;
        }
        Ok(())
    }

    fn erase_page(&mut self, addr: u32) -> Result<(), FlashError> {
        let page = self.page_at(addr).ok_or(FlashError::OutOfBounds)?;
        let span = self.span(page.start, page.size as usize)?;
        self.mem[span].fill(0xFF);
        self.erases.push(page.start);
        Ok(())
    }

    fn page_at(&self, addr: u32) -> Option<FlashPage> {
        if addr >= self.capacity() {
            return None;
        }
        Some(FlashPage {
            start: addr - addr % SIM_FLASH_PAGE,
            size: SIM_FLASH_PAGE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_programming_only_clears_bits() {
        let mut flash = SimFlash::new();
        flash.write(0, &[0x0F]).unwrap();
        flash.write(0, &[0xF3]).unwrap();

        let mut buf = [0u8; 1];
        flash.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0x03]);

        flash.erase_page(0).unwrap();
        flash.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xFF]);
        assert_eq!(flash.erased_pages(), &[0]);
    }

    #[test]
    fn test_bounds_are_enforced() {
        let mut flash = SimFlash::new();
        let capacity = flash.capacity();
        let mut buf = [0u8; 8];

        assert_eq!(
            flash.read(capacity - 4, &mut buf),
            Err(FlashError::OutOfBounds)
        );
        assert!(flash.page_at(capacity).is_none());
        assert_eq!(flash.page_at(capacity - 1).map(|p| p.start), Some(capacity - SIM_FLASH_PAGE));
    }
}
