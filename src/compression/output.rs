//! Lossless schemes available for written rasters

use std::fmt;
use std::str::FromStr;

use crate::tiff::errors::{TiffError, TiffResult};
use super::factory::CompressionFactory;
use super::handler::CompressionHandler;

/// Compression applied to output strips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputCompression {
    None,
    #[default]
    PackBits,
    Deflate,
    Zstd,
}

impl OutputCompression {
    pub const ALL: [OutputCompression; 4] = [
        OutputCompression::None,
        OutputCompression::PackBits,
        OutputCompression::Deflate,
        OutputCompression::Zstd,
    ];

    /// Lowercase name as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            OutputCompression::None => "none",
            OutputCompression::PackBits => "packbits",
            OutputCompression::Deflate => "deflate",
            OutputCompression::Zstd => "zstd",
        }
    }

    /// Handler that encodes strips with this scheme
    pub fn handler(self) -> TiffResult<Box<dyn CompressionHandler>> {
        CompressionFactory::get_handler_by_name(self.name())
    }
}

impl FromStr for OutputCompression {
    type Err = TiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputCompression::ALL.into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TiffError::GenericError(format!("Unknown output compression: {}", s)))
    }
}

impl fmt::Display for OutputCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
