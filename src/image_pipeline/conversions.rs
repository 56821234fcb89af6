//! Pipeline conversions module
//!
//! This module contains orchestration logic for turning CR2 input into
//! grayscale TIFF output.

mod cr2_to_tiff;


pub use cr2_to_tiff::Cr2ToTiffPipeline;
