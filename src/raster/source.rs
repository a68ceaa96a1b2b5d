//! Read-only handle on a multispectral GeoTIFF
//!
//! The handle owns the open file and the decoded directory structure. It is
//! released when dropped, whichever way processing ends.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, info};
use ndarray::Array2;

use crate::combination::Band;
use crate::errors::{BandKitError, BandKitResult};
use crate::extractor::{Chunking, RasterLayout, StripReader, TileReader};
use crate::tiff::errors::TiffError;
use crate::tiff::geotags::GeoReference;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// An open source raster
pub struct SourceRaster {
    path: PathBuf,
    file: BufReader<File>,
    reader: TiffReader,
    ifd: IFD,
    layout: RasterLayout,
    georef: GeoReference,
}

impl SourceRaster {
    /// Opens `path` and reads its first full-resolution image directory
    pub fn open(path: &Path) -> BandKitResult<Self> {
        let file = File::open(path)?;
        let mut file = BufReader::new(file);

        let mut reader = TiffReader::new();
        let tiff = reader.read(&mut file)?;
        let ifd = tiff.image_ifd()?.clone();

        let layout = RasterLayout::from_ifd(&reader, &mut file, &ifd)?;
        let georef = GeoReference::read(&reader, &mut file, &ifd)?;

        info!("Opened {}: {}", path.display(), layout);
        if ifd.number > 0 {
            debug!("Using IFD #{}, earlier directories are overviews", ifd.number);
        }

        Ok(SourceRaster {
            path: path.to_path_buf(),
            file,
            reader,
            ifd,
            layout,
            georef,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> &RasterLayout {
        &self.layout
    }

    pub fn georef(&self) -> &GeoReference {
        &self.georef
    }

    /// Number of bands stacked in the image
    pub fn band_count(&self) -> u16 {
        self.layout.samples_per_pixel
    }

    /// `(height, width)`
    pub fn dim(&self) -> (usize, usize) {
        (self.layout.height as usize, self.layout.width as usize)
    }

    /// Reads one band as f32, shaped `(height, width)`
    pub fn read_band(&mut self, band: Band) -> BandKitResult<Array2<f32>> {
        if band.index() as u16 > self.band_count() {
            return Err(BandKitError::BandOutOfRange { band: band.index(), available: self.band_count() });
        }

        if self.layout.is_empty() {
            debug!("{} has no pixels, band {} is empty", self.path.display(), band);
            return Ok(Array2::zeros(self.dim()));
        }

        debug!("Reading band {} from {}", band, self.path.display());
        let sample = band.index() as usize - 1;

        let values = match self.layout.chunking {
            Chunking::Strips { rows_per_strip } => {
                StripReader::new(&self.reader, &self.ifd, &self.layout, rows_per_strip)
                    .read_band(&mut self.file, sample)?
            }
            Chunking::Tiles { tile_width, tile_length } => {
                TileReader::new(&self.reader, &self.ifd, &self.layout, tile_width, tile_length)
                    .read_band(&mut self.file, sample)?
            }
        };

        Array2::from_shape_vec(self.dim(), values)
            .map_err(|e| BandKitError::Tiff(TiffError::GenericError(e.to_string())))
    }
}

impl Drop for SourceRaster {
    fn drop(&mut self) {
        debug!("Closing {}", self.path.display());
    }
}
