//! TIFF tag utilities
//!
//! Utilities for working with TIFF tags and their values.

use crate::io::byte_order::ByteOrder;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::constants::{field_types, tags, compression, photometric};

/// Determine how much space a particular TIFF field type needs in bytes
pub fn get_field_type_size(field_type: u16) -> usize {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1,
    }
}

/// Decodes the integer values of a tag from its raw bytes
///
/// # Arguments
/// * `data` - The tag's value bytes, in file byte order
/// * `field_type` - The TIFF field type of the entry
/// * `byte_order` - Byte order of the file the bytes came from
///
/// # Returns
/// One u64 per value
pub fn decode_integer_values(data: &[u8], field_type: u16, byte_order: ByteOrder) -> TiffResult<Vec<u64>> {
    let width = match field_type {
        field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG => 4,
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => return Err(TiffError::UnsupportedFieldType(field_type)),
    };

    Ok(data.chunks_exact(width)
        .map(|chunk| byte_order.uint_from_bytes(chunk, width))
        .collect())
}

/// Decodes the floating point values of a tag from its raw bytes
///
/// Integer field types are widened so that producers writing e.g. a
/// ModelPixelScale as LONG are still understood.
pub fn decode_float_values(data: &[u8], field_type: u16, byte_order: ByteOrder) -> TiffResult<Vec<f64>> {
    match field_type {
        field_types::DOUBLE => Ok(data.chunks_exact(8)
            .map(|chunk| byte_order.f64_from_bytes(chunk))
            .collect()),
        field_types::FLOAT => Ok(data.chunks_exact(4)
            .map(|chunk| byte_order.f32_from_bytes(chunk) as f64)
            .collect()),
        _ => decode_integer_values(data, field_type, byte_order)
            .map(|values| values.into_iter().map(|v| v as f64).collect()),
    }
}

/// Get the name of a TIFF tag
///
/// Returns a human-readable name for a tag based on its numeric ID.
/// If the tag is not recognized, returns "Unknown".
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        tags::NEW_SUBFILE_TYPE => "NewSubfileType",
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",
        tags::PLANAR_CONFIGURATION => "PlanarConfiguration",
        tags::SOFTWARE => "Software",
        tags::PREDICTOR => "Predictor",
        tags::TILE_WIDTH => "TileWidth",
        tags::TILE_LENGTH => "TileLength",
        tags::TILE_OFFSETS => "TileOffsets",
        tags::TILE_BYTE_COUNTS => "TileByteCounts",
        tags::EXTRA_SAMPLES => "ExtraSamples",
        tags::SAMPLE_FORMAT => "SampleFormat",

        // GeoTIFF tags
        tags::MODEL_PIXEL_SCALE_TAG => "ModelPixelScale",
        tags::MODEL_TIEPOINT_TAG => "ModelTiepoint",
        tags::MODEL_TRANSFORMATION_TAG => "ModelTransformation",
        tags::GEO_KEY_DIRECTORY_TAG => "GeoKeyDirectory",
        tags::GEO_DOUBLE_PARAMS_TAG => "GeoDoubleParams",
        tags::GEO_ASCII_PARAMS_TAG => "GeoAsciiParams",

        tags::GDAL_NODATA => "GDALNoData",

        _ => "Unknown",
    }
}

/// Get the name of a TIFF field type
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}

/// Get the name of a compression method
pub fn get_compression_name(compression_code: u64) -> &'static str {
    match compression_code as u16 {
        compression::NONE => "None",
        compression::LZW => "LZW",
        compression::JPEG => "JPEG",
        compression::DEFLATE | compression::DEFLATE_OLD => "Adobe Deflate",
        compression::PACKBITS => "PackBits",
        compression::ZSTD => "Zstandard",
        _ => "Unknown",
    }
}

/// Get the name of a photometric interpretation method
pub fn get_photometric_name(photometric_code: u64) -> &'static str {
    match photometric_code as u16 {
        photometric::WHITE_IS_ZERO => "WhiteIsZero",
        photometric::BLACK_IS_ZERO => "BlackIsZero",
        photometric::RGB => "RGB",
        photometric::PALETTE => "Palette",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_big_endian_shorts() {
        let data = [0x00, 0x10, 0x01, 0x00];
        let values = decode_integer_values(&data, field_types::SHORT, ByteOrder::BigEndian).unwrap();
        assert_eq!(values, vec![16, 256]);
    }

    #[test]
    fn widens_long_to_double() {
        let data = 30u32.to_le_bytes();
        let values = decode_float_values(&data, field_types::LONG, ByteOrder::LittleEndian).unwrap();
        assert_eq!(values, vec![30.0]);
    }

    #[test]
    fn rejects_rational_as_integer() {
        let data = [0u8; 8];
        assert!(decode_integer_values(&data, field_types::RATIONAL, ByteOrder::LittleEndian).is_err());
    }
}
