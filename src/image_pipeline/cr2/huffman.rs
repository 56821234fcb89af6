//! Canonical Huffman decode tables for the lossless-JPEG entropy code.
//!
//! A DHT segment describes each table as 16 per-length code counts followed
//! by the leaf bytes. Codes are assigned canonically: leaves in ascending
//! length order, each taking the next free code at its length, with the
//! code doubled when moving to the next length. The decoder looks codes up
//! by (bit length, code), probing the longest plausible length first.

use std::collections::HashMap;

/// Shortest code length the decoder probes. Canon DC tables never assign
/// 1-bit codes.
const MIN_CODE_LEN: usize = 2;

/// One canonical code assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffmanEntry {
    pub length: u8,
    pub code: u16,
    pub leaf: u8,
}

#[derive(Debug, Clone)]
pub struct HuffmanTable {
    map: HashMap<(u8, u16), u8>,
    entries: Vec<HuffmanEntry>,
}

impl HuffmanTable {
    /// Build a decode table from the 16 per-length counts and the leaf
    /// bytes in table order. Extra leaves beyond the counts are ignored.
    pub fn build(counts: &[u8; 16], leaves: &[u8]) -> Self {
        let mut entries = Vec::new();
        let mut map = HashMap::new();
        let mut leaf_iter = leaves.iter().copied();
        let mut code: u16 = 0;

        for length in 1..=16u8 {
            for _ in 0..counts[length as usize - 1] {
                let Some(leaf) = leaf_iter.next() else {
                    return Self { map, entries };
                };
                map.insert((length, code), leaf);
                entries.push(HuffmanEntry { length, code, leaf });
                code = code.wrapping_add(1);
            }
            code = code.wrapping_shl(1);
        }

        Self { map, entries }
    }

    pub fn lookup(&self, length: u8, code: u16) -> Option<u8> {
        self.map.get(&(length, code)).copied()
    }

    /// Match the left-aligned 16-bit lookahead window against the table,
    /// trying lengths 16 down to 2. Returns (code length, leaf).
    pub fn match_window(&self, window: u16) -> Option<(u8, u8)> {
        for length in (MIN_CODE_LEN..=16).rev() {
            let code = window >> (16 - length);
            if let Some(leaf) = self.lookup(length as u8, code) {
                return Some((length as u8, leaf));
            }
        }
        None
    }

    /// Entries in canonical assignment order.
    pub fn entries(&self) -> &[HuffmanEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The reference table: no 1-bit codes, one 2-bit code, five 3-bit
    /// codes, then one code per length up to 13 bits.
    fn reference_counts() -> [u8; 16] {
        [0, 1, 5, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0]
    }

    fn reference_table() -> HuffmanTable {
        let leaves: Vec<u8> = (0..16).collect();
        HuffmanTable::build(&reference_counts(), &leaves)
    }

    #[test]
    fn canonical_assignment_matches_known_codes() {
        let table = reference_table();
        let entries = table.entries();
        assert_eq!(entries.len(), 16);

        assert_eq!(entries[0], HuffmanEntry { length: 2, code: 0, leaf: 0 });
        assert_eq!(entries[1], HuffmanEntry { length: 3, code: 2, leaf: 1 });
        assert_eq!(entries[2], HuffmanEntry { length: 3, code: 3, leaf: 2 });
        assert_eq!(entries[8], HuffmanEntry { length: 6, code: 62, leaf: 8 });
        assert_eq!(entries[15], HuffmanEntry { length: 13, code: 8190, leaf: 15 });
    }

    #[test]
    fn codes_are_distinct_and_prefix_free() {
        let table = reference_table();
        let entries = table.entries();
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                if a.length == b.length {
                    assert_ne!(a.code, b.code, "duplicate code at length {}", a.length);
                } else {
                    let (short, long) = if a.length < b.length { (a, b) } else { (b, a) };
                    let shift = long.length - short.length;
                    assert_ne!(
                        long.code >> shift,
                        short.code,
                        "{:?} is a prefix of {:?}",
                        short,
                        long
                    );
                }
            }
        }
    }

    #[test]
    fn encode_of_own_entries_round_trips() {
        let table = reference_table();

        // Emit each entry's code MSB-first into a byte stream.
        let mut bytes = Vec::new();
        let mut acc: u32 = 0;
        let mut used: u32 = 0;
        for entry in table.entries() {
            acc = (acc << entry.length) | entry.code as u32;
            used += entry.length as u32;
            while used >= 8 {
                used -= 8;
                bytes.push((acc >> used) as u8);
            }
        }
        if used > 0 {
            // Pad with 1-bits, which cannot start a valid short code here.
            bytes.push(((acc << (8 - used)) as u8) | ((1 << (8 - used)) - 1));
        }

        let mut cursor = crate::image_pipeline::common::bits::BitCursor::new(&bytes);
        let mut decoded = Vec::new();
        for _ in 0..table.entries().len() {
            let (length, leaf) = table.match_window(cursor.peek16()).expect("code must match");
            cursor.consume(length as usize);
            decoded.push(leaf);
        }
        let expected: Vec<u8> = table.entries().iter().map(|e| e.leaf).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn unmatched_window_returns_none() {
        let counts = {
            let mut c = [0u8; 16];
            c[1] = 1; // single 2-bit code 00
            c
        };
        let table = HuffmanTable::build(&counts, &[7]);
        // Window starting 11... matches nothing.
        assert_eq!(table.match_window(0xFFFF), None);
        assert_eq!(table.match_window(0x0000), Some((2, 7)));
    }
}
