//! RAW image reading module
//!
//! This module provides the reader seam and the CR2 implementation that
//! decodes the raw sensor plane.

mod cr2_reader;
mod reader;
pub mod types;

pub use cr2_reader::Cr2Reader;
pub use reader::RawImageReader;
pub use types::RawImageData;
