//! Deinterleaving of slice-sequential samples into raster order.
//!
//! Canon stores the raw plane as vertical slices decoded one after
//! another: `count` slices of uniform width followed by one last slice of
//! its own width. The permutation is a bijection; the output buffer has
//! exactly the input's size.

use crate::image_pipeline::cr2::types::SliceGeometry;

/// (slice index, row within slice, column within slice) for a linear
/// slice-sequential index. Indices past the uniform slices clamp into the
/// last slice, whose distinct width applies.
fn slice_position(index: usize, slices: &SliceGeometry, lines: usize) -> (usize, usize, usize) {
    let count = slices.count as usize;
    let per_slice = lines * slices.slice_width as usize;
    let slice = if per_slice == 0 {
        count
    } else {
        (index / per_slice).min(count)
    };
    let within = index - slice * per_slice;
    let width = if slice == count {
        slices.last_width as usize
    } else {
        slices.slice_width as usize
    };
    // A zero-width last slice holds no samples of its own; indices that
    // clamp into it stay on one row rather than dividing by zero.
    let width = width.max(1);
    (slice, within / width, within % width)
}

/// Permute slice-sequential samples into raster order.
///
/// `samples` must hold exactly `slices.image_width() * lines` values, which
/// the decoder's sample-count check guarantees.
pub fn deinterleave(samples: &[u16], slices: &SliceGeometry, lines: usize) -> Vec<u16> {
    let image_width = slices.image_width();
    let mut raster = vec![0u16; samples.len()];
    for (index, &sample) in samples.iter().enumerate() {
        let (slice, row, column) = slice_position(index, slices, lines);
        raster[row * image_width + slice * slices.slice_width as usize + column] = sample;
    }
    raster
}
