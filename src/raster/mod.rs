//! Raster handles and band arrays

mod numeric;
mod rgb;
mod source;

pub use numeric::ArithmeticPolicy;
pub use rgb::RgbBands;
pub use source::SourceRaster;
