//! Handler for Adobe Deflate compressed data

use std::io::{Read, Write};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use log::debug;
use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// Adobe Deflate (Zlib) compression handler (compression codes 8 and 32946)
pub struct AdobeDeflateHandler;

impl CompressionHandler for AdobeDeflateHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut decompressed_data = Vec::new();
        if ZlibDecoder::new(data).read_to_end(&mut decompressed_data).is_ok() {
            return Ok(decompressed_data);
        }

        // Some writers emit raw deflate streams without the zlib header
        debug!("Zlib header missing, retrying as raw deflate");
        decompressed_data.clear();
        DeflateDecoder::new(data)
            .read_to_end(&mut decompressed_data)
            .map_err(|e| TiffError::DecompressionError(format!("Deflate: {}", e)))?;
        Ok(decompressed_data)
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn name(&self) -> &'static str {
        "Deflate"
    }

    fn code(&self) -> u64 {
        compression::DEFLATE as u64
    }
}
