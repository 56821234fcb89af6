//! Recursive directory walker for the CR2 container.
//!
//! Parses the container header, then follows chained directories from the
//! first-directory offset. EXIF and maker-note entries recurse into child
//! directories; the Canon slice descriptor is captured as geometry. A
//! visited-offset set rejects cyclic or self-referential pointers.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::image_pipeline::common::bytes::{
    BYTE_ORDER_BIG, BYTE_ORDER_LITTLE, Endian, read_u8, read_u16_be,
};
use crate::image_pipeline::common::error::{Cr2Error, Result};
use crate::image_pipeline::cr2::types::{
    ContainerHeader, Directory, DirectoryEntry, IFD_ENTRY_LEN, SliceGeometry, TAG_CR2_SLICE,
    TAG_EXIF_IFD, TAG_MAKER_NOTE, tag_name,
};

const TIFF_MAGIC: u16 = 0x002A;
/// "CR", stored at offset 8 of every CR2 file.
const CR2_MAGIC: u16 = 0x4352;

pub fn parse_header(data: &[u8]) -> Result<ContainerHeader> {
    let order_word = read_u16_be(data, 0)?;
    let byte_order = match order_word {
        BYTE_ORDER_LITTLE => Endian::Little,
        BYTE_ORDER_BIG => Endian::Big,
        found => {
            return Err(Cr2Error::BadMagic {
                offset: 0,
                expected: BYTE_ORDER_LITTLE,
                found,
            });
        }
    };

    let magic = byte_order.read_u16(data, 2)?;
    if magic != TIFF_MAGIC {
        return Err(Cr2Error::BadMagic {
            offset: 2,
            expected: TIFF_MAGIC,
            found: magic,
        });
    }

    let ifd_offset = byte_order.read_u32(data, 4)? as usize;

    let cr2_magic = read_u16_be(data, 8)?;
    if cr2_magic != CR2_MAGIC {
        return Err(Cr2Error::BadMagic {
            offset: 8,
            expected: CR2_MAGIC,
            found: cr2_magic,
        });
    }
    let cr2_major = read_u8(data, 10)?;
    let cr2_minor = read_u8(data, 11)?;
    let raw_ifd_offset = byte_order.read_u32(data, 12)? as usize;

    debug!(
        ifd_offset,
        raw_ifd_offset,
        version = format_args!("{cr2_major}.{cr2_minor}"),
        "parsed container header"
    );

    Ok(ContainerHeader {
        byte_order,
        ifd_offset,
        cr2_major,
        cr2_minor,
        raw_ifd_offset,
    })
}

/// Walk the chain of top-level directories, recursing into sub-directories.
pub fn walk_directories(data: &[u8], header: &ContainerHeader) -> Result<Vec<Directory>> {
    let mut directories = Vec::new();
    let mut visited = HashSet::new();
    let mut offset = header.ifd_offset;

    while offset != 0 {
        let directory = parse_directory(data, header.byte_order, offset, 0, &mut visited)?;
        offset = directory.next_offset;
        directories.push(directory);
    }

    debug!(count = directories.len(), "walked top-level directories");
    Ok(directories)
}

fn parse_directory(
    data: &[u8],
    order: Endian,
    offset: usize,
    level: usize,
    visited: &mut HashSet<usize>,
) -> Result<Directory> {
    if !visited.insert(offset) {
        return Err(Cr2Error::CyclicDirectory { offset });
    }

    let count = order.read_u16(data, offset)? as usize;
    let mut entries = Vec::with_capacity(count);
    let mut cursor = offset + 2;

    for _ in 0..count {
        let mut entry = parse_entry(data, order, cursor, level)?;
        match entry.tag {
            TAG_EXIF_IFD | TAG_MAKER_NOTE => {
                entry.sub_directory = Some(parse_directory(
                    data,
                    order,
                    entry.value as usize,
                    level + 1,
                    visited,
                )?);
            }
            TAG_CR2_SLICE => {
                entry.slices = Some(read_slice_geometry(data, order, entry.value as usize)?);
            }
            _ => {}
        }
        entries.push(entry);
        cursor += IFD_ENTRY_LEN;
    }

    let next_offset = order.read_u32(data, cursor)? as usize;

    Ok(Directory {
        offset,
        entries,
        next_offset,
    })
}

fn parse_entry(data: &[u8], order: Endian, offset: usize, level: usize) -> Result<DirectoryEntry> {
    Ok(DirectoryEntry {
        tag: order.read_u16(data, offset)?,
        field_type: order.read_u16(data, offset + 2)?,
        count: order.read_u32(data, offset + 4)?,
        value: order.read_u32(data, offset + 8)?,
        level,
        sub_directory: None,
        slices: None,
    })
}

/// Three adjacent u16 fields at the entry's value offset: slice count,
/// uniform width, last width.
fn read_slice_geometry(data: &[u8], order: Endian, offset: usize) -> Result<SliceGeometry> {
    let geometry = SliceGeometry {
        count: order.read_u16(data, offset)?,
        slice_width: order.read_u16(data, offset + 2)?,
        last_width: order.read_u16(data, offset + 4)?,
    };
    debug!(?geometry, "read slice descriptor");
    Ok(geometry)
}

/// The raw plane lives in the directory the header's raw-directory offset
/// points at; fall back to the first directory carrying a slice descriptor.
pub fn select_raw_directory<'a>(
    directories: &'a [Directory],
    header: &ContainerHeader,
) -> Result<&'a Directory> {
    directories
        .iter()
        .find(|d| d.offset == header.raw_ifd_offset)
        .or_else(|| directories.iter().find(|d| d.slice_geometry().is_some()))
        .ok_or(Cr2Error::MissingTag { tag: TAG_CR2_SLICE })
}

/// Resolve a byte range from an offset/byte-count tag pair.
pub fn find_strip(directory: &Directory, offset_tag: u16, count_tag: u16) -> Result<(usize, usize)> {
    let start = directory
        .find(offset_tag)
        .ok_or(Cr2Error::MissingTag { tag: offset_tag })?
        .value as usize;
    let length = directory
        .find(count_tag)
        .ok_or(Cr2Error::MissingTag { tag: count_tag })?
        .value as usize;
    Ok((start, length))
}

pub fn dump_directories(directories: &[Directory]) {
    for (index, directory) in directories.iter().enumerate() {
        info!(index, offset = directory.offset, "directory");
        for entry in &directory.entries {
            dump_entry(entry);
        }
    }
}

fn dump_entry(entry: &DirectoryEntry) {
    let name = tag_name(entry.level, entry.tag).unwrap_or("tag");
    info!(
        "{:indent$}{} #{:#06x}, value={}, count={}",
        "",
        name,
        entry.tag,
        entry.value,
        entry.count,
        indent = entry.level * 4
    );
    if let Some(sub) = &entry.sub_directory {
        for child in &sub.entries {
            dump_entry(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::cr2::types::{TAG_STRIP_BYTE_COUNTS, TAG_STRIP_OFFSETS};

    fn push_entry(out: &mut Vec<u8>, tag: u16, field_type: u16, count: u32, value: u32) {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&field_type.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&value.to_le_bytes());
    }

    /// Little-endian container: IFD0 at 16 with an EXIF pointer to a child
    /// directory, chained to a raw directory carrying strip and slice tags.
    fn synthetic_container() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"II");
        data.extend_from_slice(&0x002Au16.to_le_bytes());
        data.extend_from_slice(&16u32.to_le_bytes());
        data.extend_from_slice(b"CR");
        data.push(2);
        data.push(0);
        data.extend_from_slice(&58u32.to_le_bytes()); // raw IFD offset

        // IFD0 at 16: one EXIF pointer entry, next -> 58.
        assert_eq!(data.len(), 16);
        data.extend_from_slice(&1u16.to_le_bytes());
        push_entry(&mut data, TAG_EXIF_IFD, 4, 1, 34);
        data.extend_from_slice(&58u32.to_le_bytes());

        // EXIF child at 34: one plain entry, terminal.
        assert_eq!(data.len(), 34);
        data.extend_from_slice(&1u16.to_le_bytes());
        push_entry(&mut data, 0x829A, 5, 1, 0);
        data.extend_from_slice(&0u32.to_le_bytes());

        // Raw directory at 58: strip offset/count plus slice descriptor.
        data.resize(58, 0);
        data.extend_from_slice(&3u16.to_le_bytes());
        push_entry(&mut data, TAG_STRIP_OFFSETS, 4, 1, 200);
        push_entry(&mut data, TAG_STRIP_BYTE_COUNTS, 4, 1, 100);
        push_entry(&mut data, TAG_CR2_SLICE, 3, 3, 100);
        data.extend_from_slice(&0u32.to_le_bytes());

        // Slice descriptor at 100.
        data.resize(100, 0);
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&1728u16.to_le_bytes());
        data.extend_from_slice(&1888u16.to_le_bytes());
        data
    }

    #[test]
    fn parses_header_fields() {
        let data = synthetic_container();
        let header = parse_header(&data).unwrap();
        assert_eq!(header.byte_order, Endian::Little);
        assert_eq!(header.ifd_offset, 16);
        assert_eq!(header.cr2_major, 2);
        assert_eq!(header.cr2_minor, 0);
        assert_eq!(header.raw_ifd_offset, 58);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = synthetic_container();
        data[0] = b'X';
        assert!(matches!(
            parse_header(&data).unwrap_err(),
            Cr2Error::BadMagic { offset: 0, .. }
        ));

        let mut data = synthetic_container();
        data[8] = b'X';
        assert!(matches!(
            parse_header(&data).unwrap_err(),
            Cr2Error::BadMagic { offset: 8, .. }
        ));
    }

    #[test]
    fn walks_chained_and_nested_directories() {
        let data = synthetic_container();
        let header = parse_header(&data).unwrap();
        let directories = walk_directories(&data, &header).unwrap();
        assert_eq!(directories.len(), 2);

        let exif = directories[0].find(TAG_EXIF_IFD).unwrap();
        let sub = exif.sub_directory.as_ref().unwrap();
        assert_eq!(sub.entries.len(), 1);
        assert_eq!(sub.entries[0].level, 1);

        let raw = select_raw_directory(&directories, &header).unwrap();
        assert_eq!(raw.offset, 58);
        let slices = raw.slice_geometry().unwrap();
        assert_eq!(
            slices,
            SliceGeometry {
                count: 2,
                slice_width: 1728,
                last_width: 1888
            }
        );
        assert_eq!(find_strip(raw, 0x0111, 0x0117).unwrap(), (200, 100));
    }

    #[test]
    fn missing_strip_tag_is_reported() {
        let data = synthetic_container();
        let header = parse_header(&data).unwrap();
        let directories = walk_directories(&data, &header).unwrap();
        let err = find_strip(&directories[0], 0x0111, 0x0117).unwrap_err();
        assert!(matches!(err, Cr2Error::MissingTag { tag: 0x0111 }));
    }

    #[test]
    fn self_referential_directory_is_rejected() {
        let mut data = synthetic_container();
        // Point IFD0's next-directory offset back at IFD0 itself.
        let next_at = 16 + 2 + IFD_ENTRY_LEN;
        data[next_at..next_at + 4].copy_from_slice(&16u32.to_le_bytes());
        let header = parse_header(&data).unwrap();
        let err = walk_directories(&data, &header).unwrap_err();
        assert!(matches!(err, Cr2Error::CyclicDirectory { offset: 16 }));
    }

    #[test]
    fn truncated_directory_is_a_typed_error() {
        let data = synthetic_container();
        let header = parse_header(&data).unwrap();
        let err = walk_directories(&data[..20], &header).unwrap_err();
        assert!(matches!(err, Cr2Error::OutOfBounds { .. }));
    }
}
