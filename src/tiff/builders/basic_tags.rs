//! Basic TIFF tag strategies
//!
//! This module provides functionality for adding the tags that describe
//! image structure: dimensions, sample layout and strip/tile chunking.

use std::collections::HashMap;

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{extra_samples, field_types, photometric, predictor, tags};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::utils::write_utils;
use log::{debug, info};

/// Sample layout of an image about to be written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLayout {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u16,
    pub bits_per_sample: u16,
    pub sample_format: u16,
    pub planar_config: u16,
    pub photometric: u16,
    pub compression: u64,
    pub predictor: u16,
}

/// Adds basic TIFF tags to an IFD
pub struct BasicTagsBuilder;

impl BasicTagsBuilder {
    /// Adds the structural tags for `layout`
    ///
    /// Per-sample tags (BitsPerSample, SampleFormat) get one value per
    /// sample. A MinIsBlack image with more than one sample declares the
    /// extra samples as unspecified data.
    pub fn add_layout_tags(
        ifd: &mut IFD,
        external_data: &mut HashMap<(usize, u16), Vec<u8>>,
        ifd_index: usize,
        layout: &SampleLayout,
        byte_order: ByteOrder,
        is_big_tiff: bool
    ) {
        info!("Adding layout tags for {}x{} image, {} x {}-bit samples",
              layout.width, layout.height, layout.samples_per_pixel, layout.bits_per_sample);

        let mut put = |tag: u16, field_type: u16, values: &[u64]| {
            let data = write_utils::encode_integer_values(values, field_type, byte_order);
            write_utils::put_tag(ifd, external_data, ifd_index, tag, field_type, values.len() as u64,
                                 data, byte_order, is_big_tiff);
        };

        let spp = layout.samples_per_pixel as usize;

        put(tags::IMAGE_WIDTH, field_types::LONG, &[layout.width as u64]);
        put(tags::IMAGE_LENGTH, field_types::LONG, &[layout.height as u64]);
        put(tags::BITS_PER_SAMPLE, field_types::SHORT, &vec![layout.bits_per_sample as u64; spp]);
        put(tags::COMPRESSION, field_types::SHORT, &[layout.compression]);
        put(tags::PHOTOMETRIC_INTERPRETATION, field_types::SHORT, &[layout.photometric as u64]);
        put(tags::SAMPLES_PER_PIXEL, field_types::SHORT, &[spp as u64]);
        put(tags::PLANAR_CONFIGURATION, field_types::SHORT, &[layout.planar_config as u64]);
        put(tags::SAMPLE_FORMAT, field_types::SHORT, &vec![layout.sample_format as u64; spp]);

        if layout.predictor != predictor::NONE {
            put(tags::PREDICTOR, field_types::SHORT, &[layout.predictor as u64]);
        }

        if layout.photometric == photometric::BLACK_IS_ZERO && spp > 1 {
            put(tags::EXTRA_SAMPLES, field_types::SHORT, &vec![extra_samples::UNSPECIFIED as u64; spp - 1]);
        }
    }

    /// Adds the Software tag
    pub fn add_software(
        ifd: &mut IFD,
        external_data: &mut HashMap<(usize, u16), Vec<u8>>,
        ifd_index: usize,
        software: &str,
        byte_order: ByteOrder,
        is_big_tiff: bool
    ) {
        let mut data = software.as_bytes().to_vec();
        data.push(0);
        let count = data.len() as u64;
        write_utils::put_tag(ifd, external_data, ifd_index, tags::SOFTWARE, field_types::ASCII, count,
                             data, byte_order, is_big_tiff);
    }

    /// Sets up strip chunking for an IFD
    ///
    /// StripOffsets gets a placeholder entry; the writer fills in the real
    /// offsets once it knows where each strip lands.
    #[allow(clippy::too_many_arguments)]
    pub fn setup_strips(
        ifd: &mut IFD,
        external_data: &mut HashMap<(usize, u16), Vec<u8>>,
        image_data: &mut HashMap<usize, Vec<Vec<u8>>>,
        ifd_index: usize,
        strips: Vec<Vec<u8>>,
        rows_per_strip: u32,
        byte_order: ByteOrder,
        is_big_tiff: bool
    ) {
        debug!("Setting up {} strips of {} rows", strips.len(), rows_per_strip);

        let data = write_utils::encode_integer_values(&[rows_per_strip as u64], field_types::LONG, byte_order);
        write_utils::put_tag(ifd, external_data, ifd_index, tags::ROWS_PER_STRIP, field_types::LONG, 1,
                             data, byte_order, is_big_tiff);

        Self::add_chunk_tags(ifd, external_data, image_data, ifd_index, strips,
                             (tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS), byte_order, is_big_tiff);
    }

    /// Sets up tile chunking for an IFD
    ///
    /// Tiles are expected in TIFF order: row-major within a plane, planes
    /// one after the other for planar images.
    #[allow(clippy::too_many_arguments)]
    pub fn setup_tiles(
        ifd: &mut IFD,
        external_data: &mut HashMap<(usize, u16), Vec<u8>>,
        image_data: &mut HashMap<usize, Vec<Vec<u8>>>,
        ifd_index: usize,
        tiles: Vec<Vec<u8>>,
        tile_size: (u32, u32),
        byte_order: ByteOrder,
        is_big_tiff: bool
    ) {
        debug!("Setting up {} tiles of {}x{}", tiles.len(), tile_size.0, tile_size.1);

        for (tag, value) in [(tags::TILE_WIDTH, tile_size.0), (tags::TILE_LENGTH, tile_size.1)] {
            let data = write_utils::encode_integer_values(&[value as u64], field_types::LONG, byte_order);
            write_utils::put_tag(ifd, external_data, ifd_index, tag, field_types::LONG, 1,
                                 data, byte_order, is_big_tiff);
        }

        Self::add_chunk_tags(ifd, external_data, image_data, ifd_index, tiles,
                             (tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS), byte_order, is_big_tiff);
    }

    /// Adds the offsets placeholder and byte counts for a list of chunks
    #[allow(clippy::too_many_arguments)]
    fn add_chunk_tags(
        ifd: &mut IFD,
        external_data: &mut HashMap<(usize, u16), Vec<u8>>,
        image_data: &mut HashMap<usize, Vec<Vec<u8>>>,
        ifd_index: usize,
        chunks: Vec<Vec<u8>>,
        (offsets_tag, counts_tag): (u16, u16),
        byte_order: ByteOrder,
        is_big_tiff: bool
    ) {
        let field_type = if is_big_tiff { field_types::LONG8 } else { field_types::LONG };
        let count = chunks.len() as u64;

        external_data.remove(&(ifd_index, offsets_tag));
        ifd.add_entry(IFDEntry::new(offsets_tag, field_type, count, 0));

        let byte_counts: Vec<u64> = chunks.iter().map(|c| c.len() as u64).collect();
        let data = write_utils::encode_integer_values(&byte_counts, field_type, byte_order);
        write_utils::put_tag(ifd, external_data, ifd_index, counts_tag, field_type, count,
                             data, byte_order, is_big_tiff);

        image_data.insert(ifd_index, chunks);
    }
}
