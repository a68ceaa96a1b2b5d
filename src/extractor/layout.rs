//! Decoded image geometry
//!
//! Collects every tag the band decoders need into one value so the strip
//! and tile readers never go back to the IFD for structure.

use std::fmt;

use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{compression, planar_config, predictor, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;
use crate::utils::tag_utils;

/// How pixel data is chunked on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chunking {
    Strips { rows_per_strip: u32 },
    Tiles { tile_width: u32, tile_length: u32 },
}

/// Image geometry and sample encoding of a raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterLayout {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u16,
    pub bits_per_sample: u16,
    pub sample_format: u16,
    pub planar_config: u16,
    pub compression: u64,
    pub predictor: u16,
    pub chunking: Chunking,
    pub byte_order: ByteOrder,
}

impl RasterLayout {
    /// Reads the layout of the image described by `ifd`
    ///
    /// Fails when the encoding is one the band decoders cannot handle:
    /// mixed bit depths, bit depths other than 8/16/32 (64 for floats),
    /// or a predictor that does not match the sample type.
    pub fn from_ifd(reader: &TiffReader, source: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<Self> {
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        let samples_per_pixel = ifd.get_samples_per_pixel() as u16;

        let bits_per_sample = Self::uniform_value(reader, source, ifd, tags::BITS_PER_SAMPLE, 1)?;
        let sample_format = Self::uniform_value(reader, source, ifd, tags::SAMPLE_FORMAT, sample_format::UNSIGNED)?;

        let chunking = if ifd.is_tiled() {
            Chunking::Tiles {
                tile_width: ifd.get_tag_value(tags::TILE_WIDTH).unwrap_or(0) as u32,
                tile_length: ifd.get_tag_value(tags::TILE_LENGTH).unwrap_or(0) as u32,
            }
        } else if ifd.has_tag(tags::STRIP_OFFSETS) {
            // RowsPerStrip defaults to "the whole image" and may be 2^32-1
            let rows = ifd.get_tag_value(tags::ROWS_PER_STRIP).unwrap_or(height).min(height).max(1);
            Chunking::Strips { rows_per_strip: rows as u32 }
        } else {
            return Err(TiffError::GenericError("Image has neither strips nor tiles".to_string()));
        };

        let layout = RasterLayout {
            width: width as u32,
            height: height as u32,
            samples_per_pixel,
            bits_per_sample,
            sample_format,
            planar_config: ifd.get_tag_value(tags::PLANAR_CONFIGURATION)
                .unwrap_or(planar_config::CHUNKY as u64) as u16,
            compression: ifd.get_tag_value(tags::COMPRESSION).unwrap_or(compression::NONE as u64),
            predictor: ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64) as u16,
            chunking,
            byte_order: reader.byte_order()?,
        };

        layout.validate()?;
        Ok(layout)
    }

    /// Reads a per-sample tag and requires every sample to share its value
    fn uniform_value(reader: &TiffReader, source: &mut dyn SeekableReader, ifd: &IFD, tag: u16, default: u16) -> TiffResult<u16> {
        if !ifd.has_tag(tag) {
            return Ok(default);
        }

        let values = reader.read_tag_values(source, ifd, tag)?;
        let first = values.first().copied().unwrap_or(default as u64);
        if values.iter().any(|&v| v != first) {
            return Err(TiffError::GenericError(format!(
                "Per-sample {} values differ: {:?}", tag_utils::get_tag_name(tag), values)));
        }

        Ok(first as u16)
    }

    /// Checks that the sample encoding is one the decoders support
    pub fn validate(&self) -> TiffResult<()> {
        let supported = match self.sample_format {
            sample_format::UNSIGNED | sample_format::SIGNED => matches!(self.bits_per_sample, 8 | 16 | 32),
            sample_format::IEEEFP => matches!(self.bits_per_sample, 32 | 64),
            _ => false,
        };
        if !supported {
            return Err(TiffError::UnsupportedSampleType(self.sample_format, self.bits_per_sample));
        }

        let predictor_ok = match self.predictor {
            predictor::NONE => true,
            predictor::HORIZONTAL_DIFFERENCING => self.sample_format != sample_format::IEEEFP,
            predictor::FLOATING_POINT => self.sample_format == sample_format::IEEEFP,
            _ => false,
        };
        if !predictor_ok {
            return Err(TiffError::GenericError(format!(
                "Predictor {} is not valid for sample format {}", self.predictor, self.sample_format)));
        }

        if let Chunking::Tiles { tile_width, tile_length } = self.chunking {
            if tile_width == 0 || tile_length == 0 {
                return Err(TiffError::GenericError(format!(
                    "Invalid tile size {}x{}", tile_width, tile_length)));
            }
        }

        if self.planar_config != planar_config::CHUNKY && self.planar_config != planar_config::PLANAR {
            return Err(TiffError::GenericError(format!(
                "Unknown planar configuration {}", self.planar_config)));
        }

        Ok(())
    }

    /// Bytes taken by one sample
    pub fn bytes_per_sample(&self) -> usize {
        self.bits_per_sample as usize / 8
    }

    /// Whether each band is stored in its own plane
    pub fn is_planar(&self) -> bool {
        self.planar_config == planar_config::PLANAR
    }

    /// Samples stored per pixel inside one chunk
    pub fn pixel_stride(&self) -> usize {
        if self.is_planar() { 1 } else { self.samples_per_pixel as usize }
    }

    /// Whether the raster has no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for RasterLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.sample_format {
            sample_format::SIGNED => "int",
            sample_format::IEEEFP => "float",
            _ => "uint",
        };
        write!(f, "{}x{}, {} bands of {}{}, {}, {} compression, ",
               self.width, self.height, self.samples_per_pixel, kind, self.bits_per_sample,
               if self.is_planar() { "planar" } else { "interleaved" },
               tag_utils::get_compression_name(self.compression))?;

        match self.chunking {
            Chunking::Strips { rows_per_strip } => write!(f, "strips of {} rows", rows_per_strip),
            Chunking::Tiles { tile_width, tile_length } => write!(f, "{}x{} tiles", tile_width, tile_length),
        }
    }
}
