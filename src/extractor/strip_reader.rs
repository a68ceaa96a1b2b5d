//! Strip-based band extraction
//!
//! Stripped TIFFs organize image data in horizontal strips across the
//! entire width of the image. Planar images repeat the strip sequence once
//! per band, so band `s` starts at strip `s * strips_per_plane`.

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

/// Reads bands from stripped TIFF files
pub struct StripReader<'a> {
    /// TIFF reader for accessing tag values
    tiff_reader: &'a TiffReader,
    /// IFD containing the image metadata
    ifd: &'a IFD,
    layout: &'a RasterLayout,
    rows_per_strip: u32,
}

impl<'a> StripReader<'a> {
    /// Create a new strip reader
    pub fn new(tiff_reader: &'a TiffReader, ifd: &'a IFD, layout: &'a RasterLayout, rows_per_strip: u32) -> Self {
        StripReader {
            tiff_reader,
            ifd,
            layout,
            rows_per_strip,
        }
    }

    /// Decodes band `sample` (0-based) into a row-major buffer of
    /// `width * height` values
    pub fn read_band(&self, source: &mut dyn SeekableReader, sample: usize) -> TiffResult<Vec<f32>> {
        let width = self.layout.width as usize;
        let height = self.layout.height as usize;
        let rows_per_strip = self.rows_per_strip as usize;
        let strips_per_plane = height.div_ceil(rows_per_strip);

        let offsets = self.tiff_reader.read_tag_values(source, self.ifd, tags::STRIP_OFFSETS)?;
        let byte_counts = self.tiff_reader.read_tag_values(source, self.ifd, tags::STRIP_BYTE_COUNTS)?;

        let (first_strip, sample_in_pixel) = if self.layout.is_planar() {
            (sample * strips_per_plane, 0)
        } else {
            (0, sample)
        };

        let needed = first_strip + strips_per_plane;
        if offsets.len() < needed || byte_counts.len() < needed {
            return Err(TiffError::GenericError(format!(
                "Image declares {} strips, band {} needs {}", offsets.len().min(byte_counts.len()), sample + 1, needed)));
        }

        debug!("Reading band {} from {} strips starting at #{}", sample + 1, strips_per_plane, first_strip);

        let handler = CompressionFactory::create_handler(self.layout.compression)?;
        let row_len = width * self.layout.pixel_stride() * self.layout.bytes_per_sample();
        let progress = ProgressTracker::new(strips_per_plane as u64, &format!("band {}", sample + 1));

        let mut values = Vec::with_capacity(width * height);
        for strip in 0..strips_per_plane {
            let rows = rows_per_strip.min(height - strip * rows_per_strip);
            let index = first_strip + strip;

            let data = samples::load_chunk(source, offsets[index], byte_counts[index], handler.as_ref(), rows * row_len)?;
            values.extend(samples::decode_band(data, self.layout, width, rows, sample_in_pixel)?);
            progress.increment(1);
        }

        progress.finish();
        Ok(values)
    }
}
