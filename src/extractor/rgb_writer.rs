//! Writing RGB composites
//!
//! The composite is a 3-band float32 GeoTIFF, one plane per band, split
//! into strips of at most 64 KiB before compression.

use std::path::Path;

use log::debug;
use ndarray::Array2;

use crate::compression::{CompressionHandler, OutputCompression};
use crate::raster::RgbBands;
use crate::tiff::builder::{SampleLayout, TiffBuilder};
use crate::tiff::constants::{photometric, planar_config, predictor, sample_format};
use crate::tiff::errors::TiffResult;
use crate::tiff::geotags::GeoReference;

/// Uncompressed strip size cap
pub const MAX_STRIP_BYTES: usize = 64 * 1024;

/// Space reserved for header, directory and tag data when sizing the file
const METADATA_ALLOWANCE: u64 = 1024 * 1024;

const SOFTWARE: &str = concat!("bandkit ", env!("CARGO_PKG_VERSION"));

/// Rows per strip so that a strip of `width` f32 samples stays under the cap
pub fn rows_per_strip(width: usize, height: usize) -> usize {
    let row_bytes = (width * 4).max(1);
    (MAX_STRIP_BYTES / row_bytes).clamp(1, height.max(1))
}

/// Whether `payload` bytes of strips need 64-bit offsets
pub fn requires_big_tiff(payload: u64) -> bool {
    payload + METADATA_ALLOWANCE > u32::MAX as u64
}

/// Encodes one plane into compressed strips
fn plane_strips(plane: &Array2<f32>, rows_per_strip: usize, handler: &dyn CompressionHandler) -> TiffResult<Vec<Vec<u8>>> {
    plane.axis_chunks_iter(ndarray::Axis(0), rows_per_strip)
        .map(|rows| {
            let raw: Vec<u8> = rows.iter().flat_map(|v| v.to_le_bytes()).collect();
            handler.compress(&raw)
        })
        .collect()
}

/// Writes `rgb` to `path` with the given georeferencing
pub fn write_rgb(path: &Path, rgb: &RgbBands, georef: &GeoReference, compression: OutputCompression) -> TiffResult<()> {
    let (height, width) = rgb.dim();
    let rows_per_strip = rows_per_strip(width, height);
    let handler = compression.handler()?;

    let mut strips = Vec::new();
    for plane in rgb.planes() {
        strips.extend(plane_strips(plane, rows_per_strip, handler.as_ref())?);
    }

    let payload: u64 = strips.iter().map(|s| s.len() as u64).sum();
    let is_big_tiff = requires_big_tiff(payload);
    debug!("Encoded {} {} strips, {} bytes{}", strips.len(), compression, payload,
           if is_big_tiff { ", writing BigTIFF" } else { "" });

    let mut builder = TiffBuilder::new(is_big_tiff);
    let ifd = builder.add_ifd();
    builder.add_layout_tags(ifd, &SampleLayout {
        width: width as u32,
        height: height as u32,
        samples_per_pixel: 3,
        bits_per_sample: 32,
        sample_format: sample_format::IEEEFP,
        planar_config: planar_config::PLANAR,
        photometric: photometric::BLACK_IS_ZERO,
        compression: handler.code(),
        predictor: predictor::NONE,
    })?;
    builder.add_software(ifd, SOFTWARE)?;
    builder.add_georeference(ifd, georef)?;
    builder.setup_strips(ifd, strips, rows_per_strip as u32)?;

    builder.write(path)
}
