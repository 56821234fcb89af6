//! Endianness-aware fixed-width reads over an in-memory buffer.
//!
//! Every accessor bounds-checks and reports overruns as a typed error
//! instead of panicking, so malformed offsets in the container surface as
//! `Cr2Error::OutOfBounds` rather than undefined behavior.

use crate::image_pipeline::common::error::{Cr2Error, Result};

/// Little-endian byte order marker ("II").
pub const BYTE_ORDER_LITTLE: u16 = 0x4949;
/// Big-endian byte order marker ("MM").
pub const BYTE_ORDER_BIG: u16 = 0x4D4D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub fn read_u16(self, data: &[u8], offset: usize) -> Result<u16> {
        let bytes = get(data, offset, 2)?;
        Ok(match self {
            Endian::Little => u16::from_le_bytes([bytes[0], bytes[1]]),
            Endian::Big => u16::from_be_bytes([bytes[0], bytes[1]]),
        })
    }

    pub fn read_u32(self, data: &[u8], offset: usize) -> Result<u32> {
        let bytes = get(data, offset, 4)?;
        Ok(match self {
            Endian::Little => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            Endian::Big => u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        })
    }
}

pub fn read_u8(data: &[u8], offset: usize) -> Result<u8> {
    Ok(get(data, offset, 1)?[0])
}

/// Marker segments of the embedded JPEG stream are always big-endian,
/// regardless of the container byte order.
pub fn read_u16_be(data: &[u8], offset: usize) -> Result<u16> {
    Endian::Big.read_u16(data, offset)
}

fn get(data: &[u8], offset: usize, need: usize) -> Result<&[u8]> {
    offset
        .checked_add(need)
        .and_then(|end| data.get(offset..end))
        .ok_or(Cr2Error::OutOfBounds { offset, need })
}
