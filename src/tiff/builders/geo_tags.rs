//! GeoTIFF tag strategies
//!
//! Writes a `GeoReference` into an IFD so the output raster lines up with
//! its source on a map.

use std::collections::HashMap;

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::{field_types, tags};
use crate::tiff::geotags::GeoReference;
use crate::tiff::ifd::IFD;
use crate::utils::write_utils;
use log::{debug, info};

/// Handles GeoTIFF tags
pub struct GeoTagsBuilder;

impl GeoTagsBuilder {
    /// Adds every tag present in `georef` to the IFD
    pub fn add_georeference(
        ifd: &mut IFD,
        external_data: &mut HashMap<(usize, u16), Vec<u8>>,
        ifd_index: usize,
        georef: &GeoReference,
        byte_order: ByteOrder,
        is_big_tiff: bool
    ) {
        if georef.is_empty() {
            info!("Source has no georeferencing, writing a plain TIFF");
            return;
        }

        let mut put = |tag: u16, field_type: u16, count: usize, data: Vec<u8>| {
            debug!("Writing GeoTIFF tag {} ({} values)", tag, count);
            write_utils::put_tag(ifd, external_data, ifd_index, tag, field_type, count as u64,
                                 data, byte_order, is_big_tiff);
        };

        let double_tags = [
            (tags::MODEL_PIXEL_SCALE_TAG, &georef.pixel_scale),
            (tags::MODEL_TIEPOINT_TAG, &georef.tiepoints),
            (tags::MODEL_TRANSFORMATION_TAG, &georef.transformation),
            (tags::GEO_DOUBLE_PARAMS_TAG, &georef.double_params),
        ];
        for (tag, values) in double_tags {
            if let Some(values) = values {
                put(tag, field_types::DOUBLE, values.len(),
                    write_utils::encode_double_values(values, byte_order));
            }
        }

        if let Some(keys) = &georef.key_directory {
            let values: Vec<u64> = keys.iter().map(|&k| k as u64).collect();
            put(tags::GEO_KEY_DIRECTORY_TAG, field_types::SHORT, keys.len(),
                write_utils::encode_integer_values(&values, field_types::SHORT, byte_order));
        }

        for (tag, text) in [(tags::GEO_ASCII_PARAMS_TAG, &georef.ascii_params), (tags::GDAL_NODATA, &georef.nodata)] {
            if let Some(text) = text {
                put(tag, field_types::ASCII, text.len(), text.clone());
            }
        }
    }
}
