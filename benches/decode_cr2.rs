use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use cr2_decode_rs::image_pipeline::{
    ConversionConfig, Cr2Reader, Cr2ToTiffPipeline, DecodeConfig, RawImageReader, TiffCompression,
};
use std::io::Cursor;

const TAG_STRIP_OFFSETS: u16 = 0x0111;
const TAG_STRIP_BYTE_COUNTS: u16 = 0x0117;
const TAG_CR2_SLICE: u16 = 0xC640;

fn push_entry(out: &mut Vec<u8>, tag: u16, field_type: u16, count: u32, value: u32) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&field_type.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
}

/// Lossless-JPEG stream whose every difference is zero. The two-bit code 00
/// selects the zero-magnitude leaf, so a run of zero bytes decodes to a flat
/// plane at the initial predictor value.
fn flat_entropy_stream(width: u16, lines: u16) -> Vec<u8> {
    let counts: [u8; 16] = [0, 1, 5, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0];
    let leaves: Vec<u8> = (0..15).collect();

    let mut data = Vec::new();
    data.extend_from_slice(&[0xFF, 0xD8]);

    data.extend_from_slice(&[0xFF, 0xC4]);
    let dht_len = (2 + 1 + 16 + leaves.len()) as u16;
    data.extend_from_slice(&dht_len.to_be_bytes());
    data.push(0);
    data.extend_from_slice(&counts);
    data.extend_from_slice(&leaves);

    data.extend_from_slice(&[0xFF, 0xC3]);
    data.extend_from_slice(&11u16.to_be_bytes());
    data.push(14);
    data.extend_from_slice(&lines.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.push(1);
    data.extend_from_slice(&[0, 0x11, 0]);

    data.extend_from_slice(&[0xFF, 0xDA]);
    data.extend_from_slice(&8u16.to_be_bytes());
    data.push(1);
    data.extend_from_slice(&[0, 0x00]);
    data.extend_from_slice(&[0, 0, 0]);

    let samples = width as usize * lines as usize;
    data.extend(std::iter::repeat_n(0u8, samples.div_ceil(4)));
    data
}

/// A complete little-endian CR2 container around a flat entropy stream.
fn synthetic_cr2(width: u16, lines: u16) -> Vec<u8> {
    let stream = flat_entropy_stream(width, lines);

    let ifd_offset = 16usize;
    let ifd_len = 2 + 3 * 12 + 4;
    let slice_offset = ifd_offset + ifd_len;
    let strip_offset = slice_offset + 6;

    let mut data = Vec::new();
    data.extend_from_slice(b"II");
    data.extend_from_slice(&0x002Au16.to_le_bytes());
    data.extend_from_slice(&(ifd_offset as u32).to_le_bytes());
    data.extend_from_slice(b"CR");
    data.push(2);
    data.push(0);
    data.extend_from_slice(&(ifd_offset as u32).to_le_bytes());

    data.extend_from_slice(&3u16.to_le_bytes());
    push_entry(&mut data, TAG_STRIP_OFFSETS, 4, 1, strip_offset as u32);
    push_entry(&mut data, TAG_STRIP_BYTE_COUNTS, 4, 1, stream.len() as u32);
    push_entry(&mut data, TAG_CR2_SLICE, 3, 3, slice_offset as u32);
    data.extend_from_slice(&0u32.to_le_bytes());

    // Single slice spanning the full width.
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&width.to_le_bytes());

    data.extend_from_slice(&stream);
    data
}

fn benchmark_decode_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_by_size");

    let sizes = vec![(64u16, 64u16, "64x64"), (256, 256, "256x256"), (512, 512, "512x512")];

    for (width, lines, label) in sizes {
        let file = synthetic_cr2(width, lines);

        group.bench_with_input(BenchmarkId::from_parameter(label), &file, |b, data| {
            let reader = Cr2Reader::new(DecodeConfig::default());

            b.iter(|| {
                let _ = reader.read_raw(black_box(data));
            });
        });
    }

    group.finish();
}

fn benchmark_compression_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression_methods");
    let file = synthetic_cr2(256, 256);

    let compressions = vec![
        (TiffCompression::None, "none"),
        (TiffCompression::Lzw, "lzw"),
        (TiffCompression::Deflate, "deflate"),
    ];

    for (compression, label) in compressions {
        group.bench_with_input(BenchmarkId::from_parameter(label), &file, |b, data| {
            let config = ConversionConfig::builder().compression(compression).build();
            let pipeline = Cr2ToTiffPipeline::new(DecodeConfig::default(), config);

            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                let _ = pipeline.convert(black_box(data), &mut output);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_decode_sizes, benchmark_compression_methods);
criterion_main!(benches);
