//! Compression handling for TIFF files
//!
//! Strategies for the compression methods found in multispectral deliveries
//! and for the methods the RGB writer can emit.

mod handler;
mod uncompressed;
mod deflate;
mod lzw;
mod packbits;
mod factory;
mod zstd;
mod output;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use lzw::LzwHandler;
pub use packbits::PackBitsHandler;
pub use factory::CompressionFactory;
pub use zstd::ZstdHandler;
pub use output::OutputCompression;
