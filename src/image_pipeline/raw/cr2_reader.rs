use tracing::debug;

use crate::image_pipeline::common::error::{Cr2Error, Result};
use crate::image_pipeline::cr2::types::{TAG_CR2_SLICE, TAG_THUMB_LENGTH, TAG_THUMB_OFFSET};
use crate::image_pipeline::cr2::{
    DecodeConfig, decode_raw_plane, deinterleave, dump_directories, find_strip,
    parse_entropy_headers, parse_header, select_raw_directory, walk_directories,
};
use crate::image_pipeline::raw::reader::RawImageReader;
use crate::image_pipeline::raw::types::RawImageData;

/// Decodes the raw sensor plane of a Canon CR2 buffer.
#[derive(Debug, Default, Clone)]
pub struct Cr2Reader {
    config: DecodeConfig,
}

impl Cr2Reader {
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Locate the first embedded preview JPEG: the full-size preview in the
    /// first directory (strip tags) or the thumbnail in the second
    /// (0x0201/0x0202). Returns its bytes.
    pub fn preview_jpeg(&self, data: &[u8]) -> Result<Vec<u8>> {
        let header = parse_header(data)?;
        let directories = walk_directories(data, &header)?;

        let pairs = [
            (self.config.strip_offset_tag, self.config.strip_byte_count_tag),
            (TAG_THUMB_OFFSET, TAG_THUMB_LENGTH),
        ];
        for directory in &directories {
            // The raw plane itself also sits behind strip tags; skip it.
            if directory.slice_geometry().is_some() {
                continue;
            }
            for (offset_tag, count_tag) in pairs {
                let Ok((start, length)) = find_strip(directory, offset_tag, count_tag) else {
                    continue;
                };
                let Some(bytes) = start
                    .checked_add(length)
                    .and_then(|end| data.get(start..end))
                else {
                    continue;
                };
                if bytes.starts_with(&[0xFF, 0xD8]) {
                    return Ok(bytes.to_vec());
                }
            }
        }
        Err(Cr2Error::MissingTag {
            tag: TAG_THUMB_OFFSET,
        })
    }
}

impl RawImageReader for Cr2Reader {
    fn read_raw(&self, data: &[u8]) -> Result<RawImageData> {
        debug!("decoding CR2 image, {} bytes", data.len());

        let header = parse_header(data)?;
        let directories = walk_directories(data, &header)?;
        if self.config.dump_directories {
            dump_directories(&directories);
        }

        let raw_directory = select_raw_directory(&directories, &header)?;
        let (start, length) = find_strip(
            raw_directory,
            self.config.strip_offset_tag,
            self.config.strip_byte_count_tag,
        )?;
        let end = start
            .checked_add(length)
            .filter(|&end| end <= data.len())
            .ok_or(Cr2Error::OutOfBounds {
                offset: start,
                need: length,
            })?;

        let slices = raw_directory
            .slice_geometry()
            .ok_or(Cr2Error::MissingTag { tag: TAG_CR2_SLICE })?;

        let headers = parse_entropy_headers(data, start)?;
        let width = slices.image_width();
        let height = headers.frame.lines as usize;
        if width == 0 || height == 0 {
            return Err(Cr2Error::InvalidDimensions(width, height));
        }
        if headers.entropy_start > end {
            return Err(Cr2Error::OutOfBounds {
                offset: headers.entropy_start,
                need: 0,
            });
        }

        debug!(width, height, "decoding raw plane");
        let sequential = decode_raw_plane(
            &data[headers.entropy_start..end],
            &headers.frame,
            &headers.scan,
            &headers.tables,
            width,
        )?;
        let raster = deinterleave(&sequential, &slices, height);

        Ok(RawImageData {
            width,
            height,
            data: raster,
            bits_per_sample: headers.frame.precision as u32,
        })
    }
}
