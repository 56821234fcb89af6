//! Canon CR2 container and raw-plane decoding
//!
//! The CR2 format is a TIFF-derived container whose raw plane is a
//! lossless-JPEG (SOF3) entropy stream split into vertical slices. This
//! module walks the directory tree, parses the embedded marker segments,
//! builds the Huffman tables, runs the predictive decode and restores
//! raster order.

mod decoder;
mod huffman;
mod marker;
pub mod types;
mod unslice;
mod walker;

#[cfg(test)]
pub(crate) use marker::synthetic_stream;

pub use decoder::decode_raw_plane;
pub use huffman::{HuffmanEntry, HuffmanTable};
pub use marker::{EntropyHeaders, FrameHeader, ScanHeader, parse_entropy_headers};
pub use types::{
    ContainerHeader, DecodeConfig, DecodeConfigBuilder, Directory, DirectoryEntry, SliceGeometry,
};
pub use unslice::deinterleave;
pub use walker::{
    dump_directories, find_strip, parse_header, select_raw_directory, walk_directories,
};
