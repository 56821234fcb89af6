//! Marker-segment parser for the embedded lossless-JPEG stream.
//!
//! The raw plane carries exactly four segments in fixed order: SOI, DHT,
//! SOF3 and SOS. Anything else is a format error; this decoder does not
//! support out-of-order markers.

use tracing::debug;

use crate::image_pipeline::common::bytes::{read_u8, read_u16_be};
use crate::image_pipeline::common::error::{Cr2Error, Result};
use crate::image_pipeline::cr2::huffman::HuffmanTable;

const MARKER_SOI: u16 = 0xFFD8;
const MARKER_DHT: u16 = 0xFFC4;
const MARKER_SOF3: u16 = 0xFFC3;
const MARKER_SOS: u16 = 0xFFDA;

#[derive(Debug, Clone, Copy)]
pub struct FrameComponent {
    pub id: u8,
    pub h_sampling: u8,
    pub v_sampling: u8,
    /// Unused in lossless mode, kept for the record.
    pub quant_table: u8,
}

/// SOF3 payload.
#[derive(Debug, Clone)]
pub struct FrameHeader {
    pub precision: u8,
    pub lines: u16,
    pub samples_per_line: u16,
    pub components: Vec<FrameComponent>,
}

#[derive(Debug, Clone, Copy)]
pub struct ScanComponent {
    pub selector: u8,
    pub dc_table: u8,
    /// Unused in lossless mode.
    pub ac_table: u8,
}

/// SOS payload.
#[derive(Debug, Clone)]
pub struct ScanHeader {
    pub components: Vec<ScanComponent>,
}

/// Everything the predictive decoder needs, parsed from the strip's
/// marker segments.
#[derive(Debug, Clone)]
pub struct EntropyHeaders {
    pub frame: FrameHeader,
    pub scan: ScanHeader,
    pub tables: Vec<HuffmanTable>,
    /// Absolute offset of the first entropy-coded byte.
    pub entropy_start: usize,
}

fn expect_marker(data: &[u8], offset: usize, expected: u16) -> Result<()> {
    let found = read_u16_be(data, offset)?;
    if found != expected {
        return Err(Cr2Error::UnexpectedMarker {
            offset,
            expected,
            found,
        });
    }
    Ok(())
}

fn segment_length(data: &[u8], offset: usize) -> Result<u16> {
    let length = read_u16_be(data, offset)?;
    if length < 2 {
        return Err(Cr2Error::InvalidSegmentLength { offset, length });
    }
    Ok(length)
}

/// Parse the four marker segments starting at `start` (the strip offset
/// inside the full file buffer).
pub fn parse_entropy_headers(data: &[u8], start: usize) -> Result<EntropyHeaders> {
    expect_marker(data, start, MARKER_SOI)?;

    let dht_offset = start + 2;
    expect_marker(data, dht_offset, MARKER_DHT)?;
    let dht_length = segment_length(data, dht_offset + 2)?;
    let tables = parse_huffman_tables(data, dht_offset + 4, dht_offset + 2 + dht_length as usize)?;

    let sof_offset = dht_offset + 2 + dht_length as usize;
    let (frame, after_frame) = parse_frame_header(data, sof_offset)?;

    let (scan, entropy_start) = parse_scan_header(data, after_frame)?;

    debug!(
        precision = frame.precision,
        lines = frame.lines,
        samples_per_line = frame.samples_per_line,
        components = frame.components.len(),
        tables = tables.len(),
        entropy_start,
        "parsed entropy headers"
    );

    Ok(EntropyHeaders {
        frame,
        scan,
        tables,
        entropy_start,
    })
}

/// DHT payload: repeated (class/index byte, 16 counts, leaf bytes) groups.
/// The format defines exactly two tables per scan.
fn parse_huffman_tables(data: &[u8], mut offset: usize, end: usize) -> Result<Vec<HuffmanTable>> {
    let mut tables = Vec::new();
    while offset < end {
        let class_index = read_u8(data, offset)?;
        offset += 1;

        let mut counts = [0u8; 16];
        for (i, slot) in counts.iter_mut().enumerate() {
            *slot = read_u8(data, offset + i)?;
        }
        offset += 16;

        let total: usize = counts.iter().map(|&c| c as usize).sum();
        let leaves = data
            .get(offset..offset + total)
            .ok_or(Cr2Error::OutOfBounds { offset, need: total })?;
        offset += total;

        debug!(class_index, leaves = total, "building huffman table");
        tables.push(HuffmanTable::build(&counts, leaves));
    }
    Ok(tables)
}

fn parse_frame_header(data: &[u8], offset: usize) -> Result<(FrameHeader, usize)> {
    expect_marker(data, offset, MARKER_SOF3)?;
    segment_length(data, offset + 2)?;

    let precision = read_u8(data, offset + 4)?;
    let lines = read_u16_be(data, offset + 5)?;
    let samples_per_line = read_u16_be(data, offset + 7)?;
    let component_count = read_u8(data, offset + 9)?;

    let mut components = Vec::with_capacity(component_count as usize);
    let mut cursor = offset + 10;
    for _ in 0..component_count {
        let id = read_u8(data, cursor)?;
        let sampling = read_u8(data, cursor + 1)?;
        let quant_table = read_u8(data, cursor + 2)?;
        components.push(FrameComponent {
            id,
            h_sampling: sampling >> 4,
            v_sampling: sampling & 0x0F,
            quant_table,
        });
        cursor += 3;
    }

    Ok((
        FrameHeader {
            precision,
            lines,
            samples_per_line,
            components,
        },
        cursor,
    ))
}

fn parse_scan_header(data: &[u8], offset: usize) -> Result<(ScanHeader, usize)> {
    expect_marker(data, offset, MARKER_SOS)?;
    segment_length(data, offset + 2)?;

    let component_count = read_u8(data, offset + 4)?;
    let mut components = Vec::with_capacity(component_count as usize);
    let mut cursor = offset + 5;
    for _ in 0..component_count {
        let selector = read_u8(data, cursor)?;
        let tables = read_u8(data, cursor + 1)?;
        components.push(ScanComponent {
            selector,
            dc_table: tables >> 4,
            ac_table: tables & 0x0F,
        });
        cursor += 2;
    }

    // Spectral selection start/end and approximation bits: consumed only to
    // keep the offset aligned with the entropy data.
    read_u8(data, cursor + 2)?;
    let entropy_start = cursor + 3;

    Ok((ScanHeader { components }, entropy_start))
}

/// Assemble a minimal single-component entropy stream for tests: two
/// identical tables whose leaves are 0..n, one line, one sample per line.
#[cfg(test)]
pub(crate) fn synthetic_stream(counts: &[u8; 16], precision: u8, entropy: &[u8]) -> Vec<u8> {
    let leaves: Vec<u8> = (0..counts.iter().map(|&c| c as u16).sum::<u16>())
        .map(|v| v as u8)
        .collect();
    let mut data = Vec::new();

    data.extend_from_slice(&MARKER_SOI.to_be_bytes());

    data.extend_from_slice(&MARKER_DHT.to_be_bytes());
    let table_bytes = 1 + 16 + leaves.len();
    data.extend_from_slice(&((2 + 2 * table_bytes) as u16).to_be_bytes());
    for class_index in [0x00u8, 0x01] {
        data.push(class_index);
        data.extend_from_slice(counts);
        data.extend_from_slice(&leaves);
    }

    data.extend_from_slice(&MARKER_SOF3.to_be_bytes());
    data.extend_from_slice(&11u16.to_be_bytes());
    data.push(precision);
    data.extend_from_slice(&1u16.to_be_bytes()); // lines
    data.extend_from_slice(&1u16.to_be_bytes()); // samples per line
    data.push(1); // one component
    data.extend_from_slice(&[0x01, 0x11, 0x00]);

    data.extend_from_slice(&MARKER_SOS.to_be_bytes());
    data.extend_from_slice(&8u16.to_be_bytes());
    data.push(1);
    data.extend_from_slice(&[0x01, 0x00]);
    data.extend_from_slice(&[0x01, 0x00, 0x00]); // spectral selection

    data.extend_from_slice(entropy);
    data
}
