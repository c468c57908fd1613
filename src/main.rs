//! shelterdb CLI entry point
//!
//! Parsing, configuration and dispatch all live in the CLI module. This
//! file only prints the error and sets the exit code.

use shelterdb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
