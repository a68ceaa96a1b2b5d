//! Handler for LZW compressed data
//!
//! TIFF LZW is MSB-first with an 8-bit alphabet and the "early change"
//! code size switch, which weezl exposes as the TIFF size switch.

use weezl::{decode::Decoder, encode::Encoder, BitOrder};
use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// LZW compression handler (compression code 5)
pub struct LzwHandler;

impl CompressionHandler for LzwHandler {
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        Decoder::with_tiff_size_switch(BitOrder::Msb, 8)
            .decode(data)
            .map_err(|e| TiffError::DecompressionError(format!("LZW: {}", e)))
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        Encoder::with_tiff_size_switch(BitOrder::Msb, 8)
            .encode(data)
            .map_err(|e| TiffError::GenericError(format!("LZW compression error: {}", e)))
    }

    fn name(&self) -> &'static str {
        "LZW"
    }

    fn code(&self) -> u64 {
        compression::LZW as u64
    }
}
