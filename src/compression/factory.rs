//! Factory for creating compression handlers

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::lzw::LzwHandler;
use super::packbits::PackBitsHandler;
use super::zstd::ZstdHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a compression handler for the given compression code
    pub fn create_handler(code: u64) -> TiffResult<Box<dyn CompressionHandler>> {
        let code16 = u16::try_from(code).map_err(|_| TiffError::UnsupportedCompression(code))?;
        match code16 {
            compression::NONE => Ok(Box::new(UncompressedHandler)),
            compression::LZW => Ok(Box::new(LzwHandler)),
            compression::DEFLATE | compression::DEFLATE_OLD => Ok(Box::new(AdobeDeflateHandler)),
            compression::PACKBITS => Ok(Box::new(PackBitsHandler)),
            compression::ZSTD => Ok(Box::new(ZstdHandler::new())),
            _ => Err(TiffError::UnsupportedCompression(code))
        }
    }

    /// Get a handler by name
    pub fn get_handler_by_name(name: &str) -> TiffResult<Box<dyn CompressionHandler>> {
        match name.to_lowercase().as_str() {
            "uncompressed" | "none" => Ok(Box::new(UncompressedHandler)),
            "lzw" => Ok(Box::new(LzwHandler)),
            "deflate" | "zip" | "adobe deflate" => Ok(Box::new(AdobeDeflateHandler)),
            "packbits" => Ok(Box::new(PackBitsHandler)),
            "zstd" => Ok(Box::new(ZstdHandler::new())),
            _ => Err(TiffError::GenericError(format!("Unknown compression type: {}", name)))
        }
    }
}
