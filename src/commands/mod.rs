//! CLI commands
//!
//! Each run executes exactly one command: either the registry listing or
//! the processing of one image.

pub mod command_traits;
pub mod list_command;
pub mod process_command;

pub use command_traits::{Command, CommandFactory};
pub use list_command::ListCommand;
pub use process_command::ProcessCommand;

use crate::config::ProcessConfig;
use crate::errors::BandKitResult;

/// Creates the command requested by the run settings
#[derive(Debug, Default)]
pub struct BandKitCommandFactory;

impl BandKitCommandFactory {
    pub fn new() -> Self {
        BandKitCommandFactory
    }
}

impl CommandFactory for BandKitCommandFactory {
    fn create_command(&self, config: &ProcessConfig) -> BandKitResult<Box<dyn Command>> {
        if config.list_combinations {
            Ok(Box::new(ListCommand::new()))
        } else {
            Ok(Box::new(ProcessCommand::new(config)?))
        }
    }
}
