//! Rendering one image into a band combination composite

use std::fs;
use std::path::PathBuf;

use log::{debug, info};

use crate::combination::BandCombination;
use crate::config::ProcessConfig;
use crate::errors::{BandKitError, BandKitResult};
use crate::extractor::BandExtractor;

use super::command_traits::Command;

/// Command that writes the RGB composite of one combination
#[derive(Debug)]
pub struct ProcessCommand {
    combination: BandCombination,
    image_path: PathBuf,
    output_directory: PathBuf,
    extractor: BandExtractor,
}

impl ProcessCommand {
    /// Creates the command from run settings
    ///
    /// Combination, image path and output directory must all be set.
    pub fn new(config: &ProcessConfig) -> BandKitResult<Self> {
        let combination = config.combination
            .ok_or_else(|| missing("--band-combination"))?;
        let image_path = config.image_path.clone()
            .ok_or_else(|| missing("--image-path"))?;
        let output_directory = config.output_directory.clone()
            .ok_or_else(|| missing("--output-directory"))?;

        Ok(ProcessCommand {
            combination,
            image_path,
            output_directory,
            extractor: BandExtractor::new(config.arithmetic, config.compression),
        })
    }
}

fn missing(flag: &str) -> BandKitError {
    BandKitError::InvalidArgument(format!("{} is required", flag))
}

impl Command for ProcessCommand {
    fn execute(&self) -> BandKitResult<()> {
        info!("Processing {} with {}", self.image_path.display(), self.combination);
        self.combination.required_bands()?;

        if !self.output_directory.is_dir() {
            debug!("Creating output directory {}", self.output_directory.display());
            fs::create_dir_all(&self.output_directory)?;
        }

        if self.extractor.process(&self.image_path, self.combination, &self.output_directory)?.is_none() {
            debug!("{} has no pixels, nothing written", self.image_path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::OutputCompression;
    use crate::raster::ArithmeticPolicy;

    fn config() -> ProcessConfig {
        ProcessConfig {
            combination: Some(BandCombination::Water),
            image_path: Some(PathBuf::from("scene.tif")),
            output_directory: Some(PathBuf::from("out")),
            verbose: false,
            compression: OutputCompression::default(),
            log_file: None,
            arithmetic: ArithmeticPolicy::default(),
            list_combinations: false,
        }
    }

    #[test]
    fn needs_all_three_settings() {
        assert!(ProcessCommand::new(&config()).is_ok());

        let mut incomplete = config();
        incomplete.output_directory = None;
        assert!(matches!(ProcessCommand::new(&incomplete),
                         Err(BandKitError::InvalidArgument(msg)) if msg.contains("--output-directory")));
    }

    #[test]
    fn unmapped_combination_leaves_output_directory_alone() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never-created");

        let mut settings = config();
        settings.combination = Some(BandCombination::Metal);
        settings.output_directory = Some(out.clone());

        let result = ProcessCommand::new(&settings).unwrap().execute();
        assert!(matches!(result, Err(BandKitError::UnsupportedCombination(_))));
        assert!(!out.exists());
    }
}
