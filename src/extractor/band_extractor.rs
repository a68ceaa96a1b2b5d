//! Band extraction and composite writing
//!
//! Reads the three bands of a combination from a source raster and writes
//! them as the red, green and blue bands of a new GeoTIFF.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::combination::{Band, BandCombination};
use crate::compression::OutputCompression;
use crate::errors::BandKitResult;
use crate::raster::{ArithmeticPolicy, RgbBands, SourceRaster};

use super::rgb_writer;

/// Extracts band triples and writes RGB composites
#[derive(Debug, Clone, Copy, Default)]
pub struct BandExtractor {
    policy: ArithmeticPolicy,
    compression: OutputCompression,
}

impl BandExtractor {
    pub fn new(policy: ArithmeticPolicy, compression: OutputCompression) -> Self {
        BandExtractor { policy, compression }
    }

    pub fn policy(&self) -> ArithmeticPolicy {
        self.policy
    }

    /// Reads `bands` as (red, green, blue)
    pub fn extract(&self, source: &mut SourceRaster, bands: [Band; 3]) -> BandKitResult<RgbBands> {
        let [red, green, blue] = bands;
        debug!("Extracting red={}, green={}, blue={}", red, green, blue);

        let rgb = RgbBands::new(
            source.read_band(red)?,
            source.read_band(green)?,
            source.read_band(blue)?,
        )?;

        rgb.check(self.policy)?;
        Ok(rgb)
    }

    /// Writes `rgb` next to the other outputs in `output_dir`
    ///
    /// Returns `None` without touching the filesystem when any band is empty.
    pub fn write(
        &self,
        source: &SourceRaster,
        rgb: &RgbBands,
        output_dir: &Path,
        combination: BandCombination
    ) -> BandKitResult<Option<PathBuf>> {
        if rgb.is_empty() {
            debug!("Nothing to write for {}: band arrays are empty", source.path().display());
            return Ok(None);
        }

        let path = output_path(output_dir, source.path(), combination);
        rgb_writer::write_rgb(&path, rgb, source.georef(), self.compression)?;
        Ok(Some(path))
    }

    /// Runs the whole conversion for one image
    ///
    /// The combination is resolved before the image is opened, so an
    /// unmapped combination fails without any I/O.
    pub fn process(&self, image_path: &Path, combination: BandCombination, output_dir: &Path) -> BandKitResult<Option<PathBuf>> {
        let bands = combination.required_bands()?;

        let mut source = SourceRaster::open(image_path)?;
        let rgb = self.extract(&mut source, bands)?;
        let written = self.write(&source, &rgb, output_dir, combination)?;

        if let Some(path) = &written {
            info!("Wrote {} composite to {}", combination, path.display());
        }
        Ok(written)
    }
}

/// `<output_dir>/<stem>_<combination>_processed.tif`
pub fn output_path(output_dir: &Path, image_path: &Path, combination: BandCombination) -> PathBuf {
    let stem = image_path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}_{}_processed.tif", stem, combination.slug()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_uses_stem_and_slug() {
        let path = output_path(Path::new("/out"), Path::new("/data/scene.tif"), BandCombination::Water);
        assert_eq!(path, PathBuf::from("/out/scene_water_processed.tif"));
    }

    #[test]
    fn only_the_last_extension_is_dropped() {
        let path = output_path(Path::new("out"), Path::new("a.b.tiff"), BandCombination::ExposedSoil);
        assert_eq!(path, PathBuf::from("out/a.b_exposed_soil_processed.tif"));
    }

    #[test]
    fn unmapped_combination_fails_before_opening() {
        let result = BandExtractor::default()
            .process(Path::new("/does/not/exist.tif"), BandCombination::Fires, Path::new("/tmp"));
        assert!(matches!(result, Err(crate::errors::BandKitError::UnsupportedCombination(_))));
    }
}
