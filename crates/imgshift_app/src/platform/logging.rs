//! Logger setup for the imgshift binary.
//!
//! Logs go to the terminal unless `--log-file` is given, in which case they
//! go only to that file so the interactive shell output stays clean.

use imgshift_logging::LogDestination;

use super::cli::LogArgs;

pub fn initialize(args: &LogArgs) {
    let destination = match &args.log_file {
        Some(path) => LogDestination::File(path.clone()),
        None => LogDestination::Terminal,
    };
    if !imgshift_logging::initialize(destination, args.log_level) {
        eprintln!("Warning: logging is disabled");
    }
}
