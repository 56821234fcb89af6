//! CR2 container data types and tag constants.

use crate::image_pipeline::common::bytes::Endian;

/// ImageWidth.
pub const TAG_IMAGE_WIDTH: u16 = 0x0100;
/// ImageLength (height).
pub const TAG_IMAGE_HEIGHT: u16 = 0x0101;
/// Camera model string.
pub const TAG_MODEL: u16 = 0x0110;
/// StripOffsets: start of the strip byte range.
pub const TAG_STRIP_OFFSETS: u16 = 0x0111;
/// Orientation.
pub const TAG_ORIENTATION: u16 = 0x0112;
/// StripByteCounts: length of the strip byte range.
pub const TAG_STRIP_BYTE_COUNTS: u16 = 0x0117;
/// Thumbnail JPEG offset (IFD1).
pub const TAG_THUMB_OFFSET: u16 = 0x0201;
/// Thumbnail JPEG length (IFD1).
pub const TAG_THUMB_LENGTH: u16 = 0x0202;
/// EXIF sub-directory pointer.
pub const TAG_EXIF_IFD: u16 = 0x8769;
/// Maker-note sub-directory pointer.
pub const TAG_MAKER_NOTE: u16 = 0x927C;
/// Canon slice descriptor: three adjacent u16 fields.
pub const TAG_CR2_SLICE: u16 = 0xC640;

/// Size of one directory entry in bytes.
pub const IFD_ENTRY_LEN: usize = 12;

/// Human-readable names for the tags the directory dump labels, per
/// nesting level (top level, EXIF, maker note).
pub fn tag_name(level: usize, tag: u16) -> Option<&'static str> {
    match (level, tag) {
        (0, TAG_IMAGE_WIDTH) => Some("width"),
        (0, TAG_IMAGE_HEIGHT) => Some("height"),
        (0, TAG_MODEL) => Some("model"),
        (0, TAG_STRIP_OFFSETS) => Some("stripOffset"),
        (0, TAG_ORIENTATION) => Some("orientation"),
        (0, TAG_STRIP_BYTE_COUNTS) => Some("stripByteCounts"),
        (0, 0x011A) => Some("xResolution"),
        (0, TAG_EXIF_IFD) => Some("exif"),
        (0, TAG_CR2_SLICE) => Some("cr2Slice"),
        (1, 0x829A) => Some("exposureTime"),
        (1, 0x829D) => Some("fNumber"),
        (2, 0x0001) => Some("canonCameraSettings"),
        (2, 0x0002) => Some("canonFocalLength"),
        _ => None,
    }
}

/// File-level metadata parsed once from the first 16 bytes.
#[derive(Debug, Clone, Copy)]
pub struct ContainerHeader {
    pub byte_order: Endian,
    pub ifd_offset: usize,
    pub cr2_major: u8,
    pub cr2_minor: u8,
    pub raw_ifd_offset: usize,
}

/// Canon slice layout: `count` slices of `slice_width` samples followed by
/// one slice of `last_width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceGeometry {
    pub count: u16,
    pub slice_width: u16,
    pub last_width: u16,
}

impl SliceGeometry {
    pub fn image_width(&self) -> usize {
        self.count as usize * self.slice_width as usize + self.last_width as usize
    }
}

/// One tagged metadata item of a directory.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub tag: u16,
    pub field_type: u16,
    pub count: u32,
    /// Inlined value or offset, depending on the tag's type and count.
    pub value: u32,
    pub level: usize,
    pub sub_directory: Option<Directory>,
    pub slices: Option<SliceGeometry>,
}

/// Ordered entries plus the next-sibling pointer (0 = terminal).
#[derive(Debug, Clone)]
pub struct Directory {
    pub offset: usize,
    pub entries: Vec<DirectoryEntry>,
    pub next_offset: usize,
}

impl Directory {
    pub fn find(&self, tag: u16) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    pub fn slice_geometry(&self) -> Option<SliceGeometry> {
        self.entries.iter().find_map(|e| e.slices)
    }
}

/// Configuration threaded through the decode entry point.
///
/// The strip tag pair is the directory-selection policy: it names which
/// tags identify the raw-plane byte range among the parsed directories.
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    pub strip_offset_tag: u16,
    pub strip_byte_count_tag: u16,
    /// Log a human-readable dump of the parsed directory trees.
    pub dump_directories: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            strip_offset_tag: TAG_STRIP_OFFSETS,
            strip_byte_count_tag: TAG_STRIP_BYTE_COUNTS,
            dump_directories: false,
        }
    }
}

impl DecodeConfig {
    pub fn builder() -> DecodeConfigBuilder {
        DecodeConfigBuilder::default()
    }
}

/// Builder for DecodeConfig
#[derive(Default)]
pub struct DecodeConfigBuilder {
    strip_offset_tag: Option<u16>,
    strip_byte_count_tag: Option<u16>,
    dump_directories: Option<bool>,
}

impl DecodeConfigBuilder {
    pub fn strip_offset_tag(mut self, tag: u16) -> Self {
        self.strip_offset_tag = Some(tag);
        self
    }

    pub fn strip_byte_count_tag(mut self, tag: u16) -> Self {
        self.strip_byte_count_tag = Some(tag);
        self
    }

    pub fn dump_directories(mut self, enable: bool) -> Self {
        self.dump_directories = Some(enable);
        self
    }

    pub fn build(self) -> DecodeConfig {
        let default = DecodeConfig::default();
        DecodeConfig {
            strip_offset_tag: self.strip_offset_tag.unwrap_or(default.strip_offset_tag),
            strip_byte_count_tag: self
                .strip_byte_count_tag
                .unwrap_or(default.strip_byte_count_tag),
            dump_directories: self.dump_directories.unwrap_or(default.dump_directories),
        }
    }
}
