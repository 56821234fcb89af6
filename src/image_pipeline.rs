//! CR2 decoding pipeline module
//!
//! This module provides a structured approach to decoding Canon CR2 raw
//! files, with separate modules for the container walk, the lossless-JPEG
//! raw plane decode, TIFF writing, and conversion orchestration.

pub mod common;
pub mod conversions;
pub mod cr2;
pub mod raw;
pub mod tiff;

pub use common::{Cr2Error, Result};

pub use cr2::{DecodeConfig, DecodeConfigBuilder, SliceGeometry};

pub use raw::{Cr2Reader, RawImageData, RawImageReader};

pub use tiff::{
    ConversionConfig, ConversionConfigBuilder, StandardTiffWriter, TiffCompression, TiffWriter,
};

pub use conversions::Cr2ToTiffPipeline;
