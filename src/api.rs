//! Library entry point
//!
//! `BandKit` bundles the extraction settings so callers can render
//! composites without going through the command line.

use std::fs;
use std::path::{Path, PathBuf};

use crate::combination::{Band, BandCombination};
use crate::compression::OutputCompression;
use crate::errors::BandKitResult;
use crate::extractor::BandExtractor;
use crate::raster::{ArithmeticPolicy, RgbBands, SourceRaster};

/// Main interface to the bandkit library
#[derive(Debug, Clone, Copy, Default)]
pub struct BandKit {
    policy: ArithmeticPolicy,
    compression: OutputCompression,
}

impl BandKit {
    /// Propagating arithmetic, PackBits output
    pub fn new() -> Self {
        BandKit::default()
    }

    pub fn with_policy(mut self, policy: ArithmeticPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_compression(mut self, compression: OutputCompression) -> Self {
        self.compression = compression;
        self
    }

    fn extractor(&self) -> BandExtractor {
        BandExtractor::new(self.policy, self.compression)
    }

    /// Resolves a combination name to its (red, green, blue) bands
    ///
    /// # Errors
    /// `InvalidArgument` for unknown names, `UnsupportedCombination` for
    /// known names without a mapping.
    pub fn bands_for(name: &str) -> BandKitResult<[Band; 3]> {
        name.parse::<BandCombination>()?.required_bands()
    }

    /// Reads the three bands of `combination` from `image_path`
    pub fn extract(&self, image_path: &Path, combination: BandCombination) -> BandKitResult<RgbBands> {
        let bands = combination.required_bands()?;
        let mut source = SourceRaster::open(image_path)?;
        self.extractor().extract(&mut source, bands)
    }

    /// Renders `combination` from `image_path` into `output_dir`
    ///
    /// Creates `output_dir` if needed. Returns the written file, or `None`
    /// for an image without pixels.
    pub fn process(&self, image_path: &Path, combination: BandCombination, output_dir: &Path) -> BandKitResult<Option<PathBuf>> {
        combination.required_bands()?;
        fs::create_dir_all(output_dir)?;
        self.extractor().process(image_path, combination, output_dir)
    }
}
