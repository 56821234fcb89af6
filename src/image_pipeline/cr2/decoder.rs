//! Predictive (DPCM) decode of the destuffed entropy stream.
//!
//! Each sample is a Huffman symbol naming a magnitude category `m`,
//! followed by `m` raw magnitude bits. The signed difference is added to a
//! position-dependent predictor with 16-bit wraparound arithmetic. Samples
//! come out in slice-sequential order; the deinterleaver restores raster
//! order afterwards.

use tracing::debug;

use crate::image_pipeline::common::bits::{BitCursor, destuff};
use crate::image_pipeline::common::error::{Cr2Error, Result};
use crate::image_pipeline::cr2::huffman::HuffmanTable;
use crate::image_pipeline::cr2::marker::{FrameHeader, ScanHeader};

/// Sign rule for an `m`-bit magnitude field: a leading 0 bit means the
/// difference is `raw - (2^m - 1)`, i.e. the reversed magnitude is
/// subtracted; a leading 1 bit means `raw` is added directly.
/// Returns (absolute difference, subtract?).
fn signed_difference(raw: u16, m: usize) -> (u16, bool) {
    if m == 0 {
        return (0, false);
    }
    if raw & (1 << (m - 1)) != 0 {
        (raw, false)
    } else {
        ((((1u32 << m) - 1) as u16) - raw, true)
    }
}

/// Decode the raw plane from the entropy-coded byte range.
///
/// `image_width` is the full image width derived from the slice geometry;
/// the predictor's previous-row rule divides the linear decode index by it
/// even though samples are produced slice by slice. That matches the
/// shipping Canon decode and must not be changed to per-slice arithmetic.
pub fn decode_raw_plane(
    entropy: &[u8],
    frame: &FrameHeader,
    scan: &ScanHeader,
    tables: &[HuffmanTable],
    image_width: usize,
) -> Result<Vec<u16>> {
    let stream = destuff(entropy);
    let mut cursor = BitCursor::new(&stream);

    let component_count = frame.components.len().max(1);
    let expected = image_width * frame.lines as usize;
    let initial = 1u16 << (frame.precision.min(16).saturating_sub(1));

    let mut samples: Vec<u16> = Vec::with_capacity(expected);
    let mut component = 0usize;

    while samples.len() < expected {
        if cursor.remaining() == 0 {
            break;
        }

        let dc_index = scan
            .components
            .get(component)
            .map(|c| c.dc_table as usize)
            .unwrap_or(0);
        let table = tables.get(dc_index).ok_or(Cr2Error::MissingHuffmanTable {
            index: dc_index,
            count: tables.len(),
        })?;

        let Some((length, category)) = table.match_window(cursor.peek16()) else {
            return Err(Cr2Error::HuffmanMismatch {
                bit_offset: cursor.bit_offset(),
            });
        };
        if cursor.remaining() < length as usize {
            break;
        }
        cursor.consume(length as usize);

        let m = category as usize;
        // Magnitude fields are at most 16 bits; a corrupt DHT can map a code
        // to a larger leaf, which would overflow the sign rule's shifts.
        if m > 16 {
            return Err(Cr2Error::InvalidCategory {
                category,
                bit_offset: cursor.bit_offset(),
            });
        }
        if cursor.remaining() < m {
            break;
        }
        let raw = cursor.read_bits(m);

        let index = samples.len();
        let predictor = if index < component_count {
            initial
        } else if index % image_width < component_count {
            // Previous row, same column, measured in full image width.
            samples[index - image_width]
        } else {
            samples[index - component_count]
        };

        let (difference, subtract) = signed_difference(raw, m);
        let sample = if subtract {
            predictor.wrapping_sub(difference)
        } else {
            predictor.wrapping_add(difference)
        };
        samples.push(sample);

        component = (component + 1) % component_count;
    }

    if samples.len() != expected {
        return Err(Cr2Error::SampleCountMismatch {
            expected,
            actual: samples.len(),
        });
    }

    debug!(
        samples = samples.len(),
        bits_consumed = cursor.bit_offset(),
        "raw plane decoded"
    );
    Ok(samples)
}
