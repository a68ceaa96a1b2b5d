use std::process;

use log::error;

use bandkit::commands::{BandKitCommandFactory, CommandFactory};
use bandkit::config::{self, ProcessConfig};
use bandkit::utils::logger::Logger;

fn main() {
    let matches = config::cli().get_matches();

    let config = match ProcessConfig::from_matches(&matches) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = Logger::init_global_logger(config.verbose, config.log_file.as_deref()) {
        eprintln!("Error setting up logger: {}", e);
        process::exit(1);
    }

    let factory = BandKitCommandFactory::new();

    let command_result = factory.create_command(&config);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            process::exit(1);
        }
    };
}
