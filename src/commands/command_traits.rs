//! Command pattern interfaces

use crate::config::ProcessConfig;
use crate::errors::BandKitResult;

/// An executable CLI operation
pub trait Command {
    fn execute(&self) -> BandKitResult<()>;
}

/// Picks the command a run asks for
pub trait CommandFactory {
    /// Creates the command for the given settings
    ///
    /// Fails when the settings are incomplete for the chosen command.
    fn create_command(&self, config: &ProcessConfig) -> BandKitResult<Box<dyn Command>>;
}
