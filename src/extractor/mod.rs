//! Band extraction from multispectral rasters
//!
//! Decodes individual bands from stripped or tiled TIFFs and writes RGB
//! composites from them.

mod layout;
mod samples;
mod strip_reader;
mod tile_reader;
mod rgb_writer;
mod band_extractor;

pub use layout::{Chunking, RasterLayout};
pub use strip_reader::StripReader;
pub use tile_reader::TileReader;
pub use rgb_writer::{write_rgb, MAX_STRIP_BYTES};
pub use band_extractor::{output_path, BandExtractor};
