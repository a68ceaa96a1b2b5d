//! GeoTIFF georeferencing tags
//!
//! The converter never interprets the coordinate system, it carries the
//! georeferencing tags of the source image over to the output. Values are
//! decoded into native types on read so they can be re-encoded in whatever
//! byte order the output uses.

use log::debug;
use std::fmt;

use crate::io::seekable::SeekableReader;
use crate::tiff::constants::tags;
use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// GeoKey identifiers that name the coordinate reference system
pub mod geo_keys {
    pub const GEOGRAPHIC_TYPE: u16 = 2048;
    pub const PROJECTED_CS_TYPE: u16 = 3072;
}

/// One entry of a GeoKeyDirectory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoKeyEntry {
    pub key_id: u16,
    /// 0 when the value is stored in `value_offset` itself
    pub tiff_tag_location: u16,
    pub count: u16,
    pub value_offset: u16,
}

/// Georeferencing tags of an image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoReference {
    pub pixel_scale: Option<Vec<f64>>,
    pub tiepoints: Option<Vec<f64>>,
    pub transformation: Option<Vec<f64>>,
    pub key_directory: Option<Vec<u16>>,
    pub double_params: Option<Vec<f64>>,
    /// Raw ASCII bytes including the NUL terminators
    pub ascii_params: Option<Vec<u8>>,
    /// GDAL_NODATA as stored, NUL-terminated ASCII
    pub nodata: Option<Vec<u8>>,
}

impl GeoReference {
    /// Reads every georeferencing tag present in `ifd`
    ///
    /// Missing tags are simply absent; a plain TIFF yields an empty reference.
    pub fn read(reader: &TiffReader, source: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<Self> {
        let doubles = |source: &mut dyn SeekableReader, tag: u16| -> TiffResult<Option<Vec<f64>>> {
            if ifd.has_tag(tag) {
                reader.read_tag_doubles(&mut *source, ifd, tag).map(Some)
            } else {
                Ok(None)
            }
        };

        let pixel_scale = doubles(&mut *source, tags::MODEL_PIXEL_SCALE_TAG)?;
        let tiepoints = doubles(&mut *source, tags::MODEL_TIEPOINT_TAG)?;
        let transformation = doubles(&mut *source, tags::MODEL_TRANSFORMATION_TAG)?;
        let double_params = doubles(&mut *source, tags::GEO_DOUBLE_PARAMS_TAG)?;

        let key_directory = if ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
            let values = reader.read_tag_values(source, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
            Some(values.into_iter().map(|v| v as u16).collect())
        } else {
            None
        };

        let ascii = |source: &mut dyn SeekableReader, tag: u16| -> TiffResult<Option<Vec<u8>>> {
            if ifd.has_tag(tag) {
                reader.read_ascii_tag(source, ifd, tag).map(Some)
            } else {
                Ok(None)
            }
        };

        let georef = GeoReference {
            pixel_scale,
            tiepoints,
            transformation,
            key_directory,
            double_params,
            ascii_params: ascii(&mut *source, tags::GEO_ASCII_PARAMS_TAG)?,
            nodata: ascii(&mut *source, tags::GDAL_NODATA)?,
        };

        debug!("Georeference: {}", georef);
        Ok(georef)
    }

    /// True when the image carries no georeferencing at all
    pub fn is_empty(&self) -> bool {
        self == &GeoReference::default()
    }

    /// Parses the key directory into its entries
    ///
    /// The directory starts with a 4-value header whose last value is the
    /// number of keys, followed by 4 values per key.
    pub fn geo_keys(&self) -> Vec<GeoKeyEntry> {
        let Some(dir) = self.key_directory.as_deref() else {
            return Vec::new();
        };
        if dir.len() < 4 {
            return Vec::new();
        }

        let key_count = dir[3] as usize;
        dir[4..].chunks_exact(4)
            .take(key_count)
            .map(|k| GeoKeyEntry {
                key_id: k[0],
                tiff_tag_location: k[1],
                count: k[2],
                value_offset: k[3],
            })
            .collect()
    }

    /// EPSG code of the projected or geographic CRS, when given directly
    pub fn epsg_code(&self) -> Option<u16> {
        let keys = self.geo_keys();
        [geo_keys::PROJECTED_CS_TYPE, geo_keys::GEOGRAPHIC_TYPE].iter()
            .find_map(|&id| keys.iter().find(|k| k.key_id == id && k.tiff_tag_location == 0))
            .map(|k| k.value_offset)
    }
}

impl fmt::Display for GeoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }

        match self.epsg_code() {
            Some(code) => write!(f, "EPSG:{}", code)?,
            None => write!(f, "user-defined CRS")?,
        }
        if let Some(scale) = &self.pixel_scale {
            write!(f, ", pixel scale {:?}", scale)?;
        }
        if let Some(tiepoints) = &self.tiepoints {
            write!(f, ", {} tiepoint(s)", tiepoints.len() / 6)?;
        }
        if self.transformation.is_some() {
            write!(f, ", affine transformation")?;
        }
        Ok(())
    }
}
