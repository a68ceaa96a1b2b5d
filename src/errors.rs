//! Error types for band combination processing

use std::fmt;
use std::io;

use crate::tiff::errors::TiffError;

/// Errors raised while turning a multispectral image into an RGB composite
#[derive(Debug)]
pub enum BandKitError {
    /// The combination is a known identifier without a band triple
    UnsupportedCombination(String),
    /// A band index beyond the bands the image holds
    BandOutOfRange { band: u8, available: u16 },
    /// NaN or infinite values met under the rejecting arithmetic policy
    NonFiniteValues { label: String, count: usize },
    /// Arrays that should share a shape do not
    ShapeMismatch { expected: (usize, usize), found: (usize, usize) },
    /// Unknown combination name, compression name or similar bad input
    InvalidArgument(String),
    /// Unreadable or malformed settings file
    Config(String),
    /// Container or codec failure
    Tiff(TiffError),
    /// I/O error
    Io(io::Error),
}

impl fmt::Display for BandKitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandKitError::UnsupportedCombination(name) => {
                write!(f, "Band combination {} has no band mapping", name)
            }
            BandKitError::BandOutOfRange { band, available } => {
                write!(f, "Band {} requested but the image has {} band(s)", band, available)
            }
            BandKitError::NonFiniteValues { label, count } => {
                write!(f, "{} contains {} non-finite value(s)", label, count)
            }
            BandKitError::ShapeMismatch { expected, found } => {
                write!(f, "Shape mismatch: expected {}x{}, found {}x{}",
                       expected.0, expected.1, found.0, found.1)
            }
            BandKitError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            BandKitError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BandKitError::Tiff(e) => write!(f, "{}", e),
            BandKitError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for BandKitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BandKitError::Tiff(e) => Some(e),
            BandKitError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TiffError> for BandKitError {
    fn from(error: TiffError) -> Self {
        BandKitError::Tiff(error)
    }
}

impl From<io::Error> for BandKitError {
    fn from(error: io::Error) -> Self {
        BandKitError::Io(error)
    }
}

/// Result type for band combination processing
pub type BandKitResult<T> = Result<T, BandKitError>;
