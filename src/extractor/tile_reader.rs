//! Tile-based band extraction
//!
//! Tiled TIFF files organize image data in rectangular tiles of equal size.
//! Edge tiles are padded to the full tile size; only the part inside the
//! image is kept.

use log::debug;

use crate::compression::CompressionFactory;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::utils::progress::ProgressTracker;

use super::layout::RasterLayout;
use super::samples;

/// Reads bands from tiled TIFF files
pub struct TileReader<'a> {
    /// TIFF reader for accessing tag values
    tiff_reader: &'a TiffReader,
    /// IFD containing the image metadata
    ifd: &'a IFD,
    layout: &'a RasterLayout,
    tile_width: u32,
    tile_length: u32,
}

impl<'a> TileReader<'a> {
    /// Create a new tile reader
    pub fn new(tiff_reader: &'a TiffReader, ifd: &'a IFD, layout: &'a RasterLayout, tile_width: u32, tile_length: u32) -> Self {
        TileReader {
            tiff_reader,
            ifd,
            layout,
            tile_width,
            tile_length,
        }
    }

    /// Decodes band `sample` (0-based) into a row-major buffer of
    /// `width * height` values
    pub fn read_band(&self, source: &mut dyn SeekableReader, sample: usize) -> TiffResult<Vec<f32>> {
        let width = self.layout.width as usize;
        let height = self.layout.height as usize;
        let tile_width = self.tile_width as usize;
        let tile_length = self.tile_length as usize;

        let tiles_across = width.div_ceil(tile_width);
        let tiles_down = height.div_ceil(tile_length);
        let tiles_per_plane = tiles_across * tiles_down;

        let offsets = self.tiff_reader.read_tag_values(source, self.ifd, tags::TILE_OFFSETS)?;
        let byte_counts = self.tiff_reader.read_tag_values(source, self.ifd, tags::TILE_BYTE_COUNTS)?;

        let (first_tile, sample_in_pixel) = if self.layout.is_planar() {
            (sample * tiles_per_plane, 0)
        } else {
            (0, sample)
        };

        let needed = first_tile + tiles_per_plane;
        if offsets.len() < needed || byte_counts.len() < needed {
            return Err(TiffError::GenericError(format!(
                "Image declares {} tiles, band {} needs {}", offsets.len().min(byte_counts.len()), sample + 1, needed)));
        }

        debug!("Reading band {} from {}x{} tiles", sample + 1, tiles_across, tiles_down);

        let handler = CompressionFactory::create_handler(self.layout.compression)?;
        let tile_len = tile_width * tile_length * self.layout.pixel_stride() * self.layout.bytes_per_sample();
        let progress = ProgressTracker::new(tiles_per_plane as u64, &format!("band {}", sample + 1));

        let mut values = vec![0f32; width * height];
        for tile_row in 0..tiles_down {
            for tile_col in 0..tiles_across {
                let index = first_tile + tile_row * tiles_across + tile_col;
                let data = samples::load_chunk(source, offsets[index], byte_counts[index], handler.as_ref(), tile_len)?;
                let tile = samples::decode_band(data, self.layout, tile_width, tile_length, sample_in_pixel)?;

                let x0 = tile_col * tile_width;
                let y0 = tile_row * tile_length;
                let cols = tile_width.min(width - x0);
                let rows = tile_length.min(height - y0);

                for row in 0..rows {
                    let src = &tile[row * tile_width..row * tile_width + cols];
                    let dst_start = (y0 + row) * width + x0;
                    values[dst_start..dst_start + cols].copy_from_slice(src);
                }
                progress.increment(1);
            }
        }

        progress.finish();
        Ok(values)
    }
}
