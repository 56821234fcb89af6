use thiserror::Error;

#[derive(Error, Debug)]
pub enum Cr2Error {
    #[error("bad magic at offset {offset:#x}: expected {expected:#06x}, found {found:#06x}")]
    BadMagic {
        offset: usize,
        expected: u16,
        found: u16,
    },

    #[error("unexpected marker at offset {offset:#x}: expected {expected:#06x}, found {found:#06x}")]
    UnexpectedMarker {
        offset: usize,
        expected: u16,
        found: u16,
    },

    #[error("segment at offset {offset:#x} declares invalid length {length}")]
    InvalidSegmentLength { offset: usize, length: u16 },

    #[error("read of {need} bytes at offset {offset:#x} runs past end of buffer")]
    OutOfBounds { offset: usize, need: usize },

    #[error("directory chain revisits offset {offset:#x}")]
    CyclicDirectory { offset: usize },

    #[error("required tag {tag:#06x} not present")]
    MissingTag { tag: u16 },

    #[error("scan references huffman table {index} but only {count} were defined")]
    MissingHuffmanTable { index: usize, count: usize },

    #[error("no huffman code matched within 16 bits at bit offset {bit_offset}")]
    HuffmanMismatch { bit_offset: usize },

    #[error("difference category {category} exceeds 16 bits at bit offset {bit_offset}")]
    InvalidCategory { category: u8, bit_offset: usize },

    #[error("decoded {actual} samples, expected {expected}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error("invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("failed to read input file: {0}")]
    InputReadError(String),

    #[error("failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Cr2Error>;
