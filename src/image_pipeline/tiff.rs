//! TIFF writing module
//!
//! Persists decoded raw planes as grayscale 16-bit TIFF for inspection.

mod standard_tiff_writer;
pub mod types;
mod writer;

pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{ConversionConfig, ConversionConfigBuilder, TiffCompression};
pub use writer::TiffWriter;
