//! Logger setup for the command line tool
//!
//! Installs a global `log` backend built on env_logger. Every record is
//! written as `<thread>::<timestamp>::<message>`, to stderr or to a file.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::thread;

use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;

/// Global logger configuration
pub struct Logger;

impl Logger {
    /// Level for the given verbosity
    pub fn level(verbose: bool) -> LevelFilter {
        if verbose { LevelFilter::Debug } else { LevelFilter::Info }
    }

    /// Formats one log line
    pub fn format_line(thread_name: &str, timestamp: &str, message: &str) -> String {
        format!("{}::{}::{}", thread_name, timestamp, message)
    }

    /// Initializes the global logger
    ///
    /// The level comes only from `verbose`; environment variables are not
    /// consulted. With `log_file` the output goes to that file (created or
    /// truncated) instead of stderr.
    pub fn init_global_logger(verbose: bool, log_file: Option<&Path>) -> io::Result<()> {
        let mut builder = Builder::new();
        builder
            .filter_level(Self::level(verbose))
            .format(|buf, record| {
                let timestamp = buf.timestamp_millis().to_string();
                let current = thread::current();
                let line = Logger::format_line(current.name().unwrap_or("unnamed"), &timestamp,
                                               &record.args().to_string());
                writeln!(buf, "{}", line)
            });

        if let Some(path) = log_file {
            let file = File::create(path)?;
            builder.target(Target::Pipe(Box::new(file))).write_style(WriteStyle::Never);
        } else {
            builder.target(Target::Stderr);
        }

        builder.try_init()
            .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
    }
}
