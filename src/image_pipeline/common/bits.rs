//! MSB-first bit access over the destuffed entropy-coded stream.
//!
//! The cursor tracks an absolute bit offset and supports non-consuming
//! 16-bit lookahead, which is how the Huffman decoder probes candidate code
//! lengths before committing to one.

/// Remove byte-stuffing from an entropy-coded byte range: every `0x00`
/// immediately following a `0xFF` is dropped, nothing else changes.
pub fn destuff(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for (i, &b) in data.iter().enumerate() {
        if b == 0x00 && i > 0 && data[i - 1] == 0xFF {
            continue;
        }
        out.push(b);
    }
    out
}

/// MSB-first bit cursor with zero-padded lookahead past the end of data.
#[derive(Debug)]
pub struct BitCursor<'a> {
    data: &'a [u8],
    /// Absolute position in bits from the start of `data`.
    pos: usize,
}

impl<'a> BitCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn bit_offset(&self) -> usize {
        self.pos
    }

    /// Bits left before the end of the underlying data.
    pub fn remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.pos)
    }

    /// The next 16 bits without consuming them, zero-padded when fewer
    /// remain. Reads a 4-byte window so the result is correct at any bit
    /// alignment.
    pub fn peek16(&self) -> u16 {
        let byte = self.pos / 8;
        let mut window: u32 = 0;
        for i in 0..4 {
            let b = self.data.get(byte + i).copied().unwrap_or(0);
            window = (window << 8) | b as u32;
        }
        ((window << (self.pos % 8)) >> 16) as u16
    }

    /// Advance the cursor by `count` bits without returning them.
    pub fn consume(&mut self, count: usize) {
        self.pos += count;
    }

    /// Read `count` bits (0..=16) right-aligned. The caller is responsible
    /// for checking `remaining()` first; bits past the end read as zero.
    pub fn read_bits(&mut self, count: usize) -> u16 {
        debug_assert!(count <= 16);
        if count == 0 {
            return 0;
        }
        let value = self.peek16() >> (16 - count);
        self.pos += count;
        value
    }
}
