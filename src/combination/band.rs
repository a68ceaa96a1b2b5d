//! WorldView-3 band identifiers
//!
//! Eight VNIR bands followed by eight SWIR bands, numbered the way they
//! are stacked in a 16-band product.

use std::fmt;

use crate::errors::{BandKitError, BandKitResult};

/// One band of a 16-band WorldView-3 stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Band {
    Coastal = 1,
    Blue = 2,
    Green = 3,
    Yellow = 4,
    Red = 5,
    RedEdge = 6,
    NearInfrared1 = 7,
    NearInfrared2 = 8,
    Swir1 = 9,
    Swir2 = 10,
    Swir3 = 11,
    Swir4 = 12,
    Swir5 = 13,
    Swir6 = 14,
    Swir7 = 15,
    Swir8 = 16,
}

impl Band {
    /// All bands in stack order
    pub const ALL: [Band; 16] = [
        Band::Coastal, Band::Blue, Band::Green, Band::Yellow,
        Band::Red, Band::RedEdge, Band::NearInfrared1, Band::NearInfrared2,
        Band::Swir1, Band::Swir2, Band::Swir3, Band::Swir4,
        Band::Swir5, Band::Swir6, Band::Swir7, Band::Swir8,
    ];

    /// Looks up a band by its 1-based position in the stack
    pub fn from_index(index: u8) -> BandKitResult<Band> {
        index.checked_sub(1)
            .and_then(|i| Band::ALL.get(i as usize))
            .copied()
            .ok_or_else(|| BandKitError::InvalidArgument(format!("No band with index {}", index)))
    }

    /// 1-based position in the stack
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Upper-case alias, e.g. `NEAR_INFRARED_2`
    pub fn alias(self) -> &'static str {
        match self {
            Band::Coastal => "COASTAL",
            Band::Blue => "BLUE",
            Band::Green => "GREEN",
            Band::Yellow => "YELLOW",
            Band::Red => "RED",
            Band::RedEdge => "RED_EDGE",
            Band::NearInfrared1 => "NEAR_INFRARED_1",
            Band::NearInfrared2 => "NEAR_INFRARED_2",
            Band::Swir1 => "SWIR_1",
            Band::Swir2 => "SWIR_2",
            Band::Swir3 => "SWIR_3",
            Band::Swir4 => "SWIR_4",
            Band::Swir5 => "SWIR_5",
            Band::Swir6 => "SWIR_6",
            Band::Swir7 => "SWIR_7",
            Band::Swir8 => "SWIR_8",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.alias(), self.index())
    }
}
