//! TIFF file format module
//!
//! This module provides structures and functions for reading and
//! writing TIFF and BigTIFF format files.

pub mod errors;
pub mod ifd;
pub mod types;
pub mod reader;
pub mod geotags;
pub mod builder;
mod builders;
pub mod constants;
pub(crate) mod validation;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use geotags::{GeoKeyEntry, GeoReference};
pub use builder::{SampleLayout, TiffBuilder};
