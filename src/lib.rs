pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod extractor;
pub mod combination;
pub mod raster;
pub mod errors;
pub mod config;
pub mod commands;
pub mod api;

pub use crate::api::BandKit;

pub use combination::{Band, BandCombination};
pub use errors::{BandKitError, BandKitResult};
pub use extractor::BandExtractor;
pub use raster::{ArithmeticPolicy, RgbBands, SourceRaster};
pub use tiff::TiffReader;
