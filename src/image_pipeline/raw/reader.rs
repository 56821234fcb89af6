use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::types::RawImageData;

/// Seam between the CR2 decode and the conversion pipeline. Implementors
/// take a complete file buffer and produce the deinterleaved sensor plane.
pub trait RawImageReader {
    fn read_raw(&self, data: &[u8]) -> Result<RawImageData>;
}
