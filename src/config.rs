//! Run settings
//!
//! Settings come from the command line and, optionally, from a TOML file
//! given with `--config`. Values set on the command line win over the file.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};

use crate::combination::BandCombination;
use crate::compression::OutputCompression;
use crate::errors::{BandKitError, BandKitResult};
use crate::raster::ArithmeticPolicy;

/// Builds the command line definition
pub fn cli() -> ClapCommand {
    ClapCommand::new("bandkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render a WorldView-3 band combination as a float32 RGB GeoTIFF")
        .arg(
            Arg::new("band-combination")
                .long("band-combination")
                .help("Band combination identifier, e.g. WATER or GENERAL_LAND_COVER")
                .value_name("NAME")
                .value_parser(parse_combination)
                .required_unless_present("list-combinations"),
        )
        .arg(
            Arg::new("image-path")
                .long("image-path")
                .help("Multi-band source GeoTIFF")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .required_unless_present("list-combinations"),
        )
        .arg(
            Arg::new("output-directory")
                .long("output-directory")
                .help("Directory for the composite, created if absent")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .required_unless_present_any(["list-combinations", "config"]),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log at debug level")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("compression")
                .long("compression")
                .help("Output compression (none, packbits, deflate, zstd)")
                .value_name("NAME")
                .value_parser(parse_compression),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML settings file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write log output to this file instead of stderr")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("list-combinations")
                .long("list-combinations")
                .help("Print every band combination with its bands and exit")
                .action(ArgAction::SetTrue),
        )
}

fn parse_combination(value: &str) -> Result<BandCombination, String> {
    value.parse().map_err(|e: BandKitError| e.to_string())
}

fn parse_compression(value: &str) -> Result<OutputCompression, String> {
    value.parse().map_err(|e: crate::tiff::errors::TiffError| e.to_string())
}

/// Settings read from a TOML file; every key is optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSettings {
    pub verbose: Option<bool>,
    pub compression: Option<OutputCompression>,
    pub log_file: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub arithmetic: Option<ArithmeticPolicy>,
}

impl FileSettings {
    /// Parses settings from TOML text
    pub fn from_toml_str(content: &str) -> BandKitResult<Self> {
        let toml_value: toml::Value = content.parse()
            .map_err(|e| BandKitError::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut settings = FileSettings::default();

        if let Some(value) = toml_value.get("verbose") {
            settings.verbose = Some(value.as_bool()
                .ok_or_else(|| BandKitError::Config("verbose must be a boolean".to_string()))?);
        }

        if let Some(name) = Self::get_str(&toml_value, "compression")? {
            let compression = name.parse::<OutputCompression>()
                .map_err(|e| BandKitError::Config(e.to_string()))?;
            settings.compression = Some(compression);
        }

        settings.log_file = Self::get_str(&toml_value, "log_file")?.map(PathBuf::from);
        settings.output_directory = Self::get_str(&toml_value, "output_directory")?.map(PathBuf::from);

        if let Some(name) = Self::get_str(&toml_value, "arithmetic")? {
            settings.arithmetic = Some(name.parse()?);
        }

        Ok(settings)
    }

    /// Loads settings from a TOML file
    pub fn from_file(path: &Path) -> BandKitResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| BandKitError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    fn get_str<'v>(toml_value: &'v toml::Value, key: &str) -> BandKitResult<Option<&'v str>> {
        match toml_value.get(key) {
            None => Ok(None),
            Some(value) => value.as_str()
                .map(Some)
                .ok_or_else(|| BandKitError::Config(format!("{} must be a string", key))),
        }
    }
}

/// Every setting of one run
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessConfig {
    pub combination: Option<BandCombination>,
    pub image_path: Option<PathBuf>,
    pub output_directory: Option<PathBuf>,
    pub verbose: bool,
    pub compression: OutputCompression,
    pub log_file: Option<PathBuf>,
    pub arithmetic: ArithmeticPolicy,
    pub list_combinations: bool,
}

impl ProcessConfig {
    /// Builds the settings from parsed arguments, reading `--config` if given
    pub fn from_matches(args: &ArgMatches) -> BandKitResult<Self> {
        let file = match args.get_one::<PathBuf>("config") {
            Some(path) => FileSettings::from_file(path)?,
            None => FileSettings::default(),
        };
        Ok(Self::merge(args, file))
    }

    /// Combines command line values with file settings, command line first
    pub fn merge(args: &ArgMatches, file: FileSettings) -> Self {
        ProcessConfig {
            combination: args.get_one::<BandCombination>("band-combination").copied(),
            image_path: args.get_one::<PathBuf>("image-path").cloned(),
            output_directory: args.get_one::<PathBuf>("output-directory").cloned()
                .or(file.output_directory),
            verbose: args.get_flag("verbose") || file.verbose.unwrap_or(false),
            compression: args.get_one::<OutputCompression>("compression").copied()
                .or(file.compression)
                .unwrap_or_default(),
            log_file: args.get_one::<PathBuf>("log-file").cloned().or(file.log_file),
            arithmetic: file.arithmetic.unwrap_or_default(),
            list_combinations: args.get_flag("list-combinations"),
        }
    }
}
