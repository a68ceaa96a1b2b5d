//! Tests for the builder and writer

extern crate std;

use std::io::{Read, Seek, SeekFrom};
use std::vec::Vec;

use crate::io::byte_order::ByteOrder;
use crate::tiff::builder::{SampleLayout, TiffBuilder};
use crate::tiff::constants::{field_types, photometric, planar_config, predictor, sample_format, tags};
use crate::tiff::geotags::GeoReference;

use super::test_utils::write_and_read;

fn layout(samples: u16) -> SampleLayout {
    SampleLayout {
        width: 3,
        height: 4,
        samples_per_pixel: samples,
        bits_per_sample: 32,
        sample_format: sample_format::IEEEFP,
        planar_config: planar_config::PLANAR,
        photometric: photometric::BLACK_IS_ZERO,
        compression: 1,
        predictor: predictor::NONE,
    }
}

fn georef() -> GeoReference {
    GeoReference {
        pixel_scale: Some(std::vec![1.24, 1.24, 0.0]),
        tiepoints: Some(std::vec![0.0, 0.0, 0.0, 500000.0, 4100000.0, 0.0]),
        transformation: None,
        key_directory: Some(std::vec![1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 32611]),
        double_params: None,
        ascii_params: Some(b"WGS 84 / UTM zone 11N|\0".to_vec()),
        nodata: None,
    }
}

fn strips(count: usize, len: usize) -> Vec<Vec<u8>> {
    (0..count).map(|i| std::vec![i as u8 + 1; len]).collect()
}

#[test]
fn test_layout_tags_round_trip() {
    let mut builder = TiffBuilder::new(false);
    let ifd = builder.add_ifd();
    builder.add_layout_tags(ifd, &layout(3)).unwrap();
    builder.add_software(ifd, "bandkit test").unwrap();
    builder.setup_strips(ifd, strips(3, 24), 2).unwrap();

    let (reader, tiff, mut cursor) = write_and_read(&builder);
    let ifd = tiff.main_ifd().unwrap();

    std::assert_eq!(ifd.get_dimensions(), Some((3, 4)));
    std::assert_eq!(ifd.get_samples_per_pixel(), 3);
    std::assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::BITS_PER_SAMPLE).unwrap(), std::vec![32, 32, 32]);
    std::assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::SAMPLE_FORMAT).unwrap(), std::vec![3, 3, 3]);
    std::assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::EXTRA_SAMPLES).unwrap(), std::vec![0, 0]);
    std::assert_eq!(ifd.get_tag_value(tags::PLANAR_CONFIGURATION), Some(2));
    std::assert!(!ifd.has_tag(tags::PREDICTOR));
    std::assert_eq!(reader.read_ascii_tag(&mut cursor, ifd, tags::SOFTWARE).unwrap(), b"bandkit test\0".to_vec());
}

#[test]
fn test_strip_offsets_point_at_data() {
    let mut builder = TiffBuilder::new(false);
    let ifd = builder.add_ifd();
    builder.add_layout_tags(ifd, &layout(3)).unwrap();
    builder.setup_strips(ifd, strips(3, 24), 2).unwrap();

    let (reader, tiff, mut cursor) = write_and_read(&builder);
    let ifd = tiff.main_ifd().unwrap();

    let offsets = reader.read_tag_values(&mut cursor, ifd, tags::STRIP_OFFSETS).unwrap();
    let counts = reader.read_tag_values(&mut cursor, ifd, tags::STRIP_BYTE_COUNTS).unwrap();
    std::assert_eq!(counts, std::vec![24, 24, 24]);

    for (i, (offset, count)) in offsets.iter().zip(&counts).enumerate() {
        let mut data = std::vec![0u8; *count as usize];
        cursor.seek(SeekFrom::Start(*offset)).unwrap();
        cursor.read_exact(&mut data).unwrap();
        std::assert!(data.iter().all(|b| *b == i as u8 + 1), "strip {} misplaced", i);
    }
}

#[test]
fn test_single_strip_offset_inline() {
    let mut builder = TiffBuilder::new(false);
    let ifd = builder.add_ifd();
    builder.add_layout_tags(ifd, &layout(1)).unwrap();
    builder.setup_strips(ifd, strips(1, 48), 4).unwrap();

    let (reader, tiff, mut cursor) = write_and_read(&builder);
    let ifd = tiff.main_ifd().unwrap();

    let offset = reader.read_tag_values(&mut cursor, ifd, tags::STRIP_OFFSETS).unwrap()[0];
    let mut data = std::vec![0u8; 48];
    cursor.seek(SeekFrom::Start(offset)).unwrap();
    cursor.read_exact(&mut data).unwrap();
    std::assert!(data.iter().all(|b| *b == 1));
    std::assert!(!ifd.has_tag(tags::EXTRA_SAMPLES));
}

#[test]
fn test_georeference_round_trip() {
    for (byte_order, is_big_tiff) in [(ByteOrder::LittleEndian, false), (ByteOrder::BigEndian, false),
                                      (ByteOrder::LittleEndian, true)] {
        let mut builder = TiffBuilder::with_byte_order(byte_order, is_big_tiff);
        let ifd = builder.add_ifd();
        builder.add_layout_tags(ifd, &layout(3)).unwrap();
        builder.add_georeference(ifd, &georef()).unwrap();
        builder.setup_strips(ifd, strips(3, 48), 4).unwrap();

        let (reader, tiff, mut cursor) = write_and_read(&builder);
        std::assert_eq!(tiff.is_big_tiff, is_big_tiff);
        std::assert_eq!(reader.byte_order().unwrap(), byte_order);

        let read = GeoReference::read(&reader, &mut cursor, tiff.main_ifd().unwrap()).unwrap();
        std::assert_eq!(read, georef());
        std::assert_eq!(read.epsg_code(), Some(32611));
    }
}

#[test]
fn test_bigtiff_uses_long8_offsets() {
    let mut builder = TiffBuilder::new(true);
    let ifd = builder.add_ifd();
    builder.add_layout_tags(ifd, &layout(3)).unwrap();
    builder.setup_strips(ifd, strips(3, 16), 2).unwrap();

    let (_, tiff, _) = write_and_read(&builder);
    let entry = tiff.main_ifd().unwrap().get_entry(tags::STRIP_OFFSETS).unwrap();
    std::assert_eq!(entry.field_type, field_types::LONG8);
    std::assert_eq!(entry.count, 3);
}

#[test]
fn test_tiles_round_trip() {
    let mut builder = TiffBuilder::new(false);
    let ifd = builder.add_ifd();
    builder.add_layout_tags(ifd, &layout(1)).unwrap();
    builder.setup_tiles(ifd, strips(2, 16 * 16 * 4), 16, 16).unwrap();

    let (reader, tiff, mut cursor) = write_and_read(&builder);
    let ifd = tiff.main_ifd().unwrap();

    std::assert!(ifd.is_tiled());
    std::assert_eq!(ifd.get_tag_value(tags::TILE_WIDTH), Some(16));
    std::assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::TILE_BYTE_COUNTS).unwrap(),
                    std::vec![1024, 1024]);
}

#[test]
fn test_invalid_ifd_index() {
    let mut builder = TiffBuilder::new(false);
    std::assert!(builder.add_layout_tags(3, &layout(1)).is_err());
}

#[test]
fn test_external_blocks_survive_every_build() {
    let data = strips(3, 1440);
    let mut first: Option<Vec<u8>> = None;

    // Each builder hashes its tag blocks with a fresh seed
    for _ in 0..32 {
        let mut builder = TiffBuilder::new(false);
        let ifd = builder.add_ifd();
        builder.add_layout_tags(ifd, &layout(3)).unwrap();
        builder.add_software(ifd, "bandkit test").unwrap();
        builder.add_georeference(ifd, &georef()).unwrap();
        builder.setup_strips(ifd, data.clone(), 2).unwrap();

        let (reader, tiff, mut cursor) = write_and_read(&builder);
        let ifd = tiff.main_ifd().unwrap();

        std::assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::BITS_PER_SAMPLE).unwrap(), std::vec![32, 32, 32]);
        std::assert_eq!(reader.read_tag_values(&mut cursor, ifd, tags::STRIP_BYTE_COUNTS).unwrap(), std::vec![1440, 1440, 1440]);
        std::assert_eq!(reader.read_ascii_tag(&mut cursor, ifd, tags::SOFTWARE).unwrap(), b"bandkit test\0".to_vec());

        let offsets = reader.read_tag_values(&mut cursor, ifd, tags::STRIP_OFFSETS).unwrap();
        for (offset, expected) in offsets.iter().zip(&data) {
            let mut buf = std::vec![0u8; expected.len()];
            cursor.seek(SeekFrom::Start(*offset)).unwrap();
            cursor.read_exact(&mut buf).unwrap();
            std::assert_eq!(&buf, expected);
        }

        let bytes = cursor.into_inner();
        match &first {
            Some(previous) => std::assert_eq!(previous, &bytes),
            None => first = Some(bytes),
        }
    }
}
