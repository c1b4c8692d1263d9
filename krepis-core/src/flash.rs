//! Flash access policy over the raw port
//!
//! The port exposes the bare array; this layer enforces the contract the
//! interpreter relies on. Reads may be any shape inside bounds. Writes
//! must be word-aligned in address and length, because flash controllers
//! program in 32-bit units and silently mangle anything narrower. Erase
//! targets whichever page contains the address.

use krepis_hal::{FlashError, FlashPage, FlashPort};

use crate::error::HalError;

/// Programming alignment, in bytes, for address and length
pub const WRITE_ALIGN: u32 = 4;

fn check_bounds<F: FlashPort>(port: &F, addr: u32, len: usize) -> Result<(), HalError> {
    let len = len as u32;
    if addr.checked_add(len).map(|end| end <= port.capacity()) != Some(true) {
        return Err(HalError::Flash(FlashError::OutOfBounds));
    }
    Ok(())
}

/// Copy bytes out of flash
pub fn read<F: FlashPort>(port: &mut F, addr: u32, buf: &mut [u8]) -> Result<(), HalError> {
    check_bounds(port, addr, buf.len())?;
    port.read(addr, buf)?;
    Ok(())
}

/// Program bytes into flash
///
/// Rejects unaligned addresses and lengths before the port sees them.
pub fn write<F: FlashPort>(port: &mut F, addr: u32, data: &[u8]) -> Result<(), HalError> {
    if addr % WRITE_ALIGN != 0 || data.len() as u32 % WRITE_ALIGN != 0 {
        return Err(HalError::Flash(FlashError::Unaligned));
    }
    check_bounds(port, addr, data.len())?;
    port.write(addr, data)?;
    Ok(())
}

/// Erase the page containing `addr`
pub fn erase_page<F: FlashPort>(port: &mut F, addr: u32) -> Result<(), HalError> {
    if port.page_at(addr).is_none() {
        return Err(HalError::Flash(FlashError::OutOfBounds));
    }
    port.erase_page(addr)?;
    Ok(())
}

/// Geometry of the page containing `addr`, `None` past the array
pub fn page_info<F: FlashPort>(port: &F, addr: u32) -> Option<FlashPage> {
    port.page_at(addr)
}
