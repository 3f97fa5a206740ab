//! # Tile Merge CLI
//!
//! This is the binary entry point for the `tile-merge` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Translating failures into an error message and an exit code that tells
//!   CI whether rerunning the job can help.
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use clap::Parser;

use tile_merge::error::Error;
use tile_merge::exit_codes;

fn main() {
    let cli = cli::Cli::parse();
    if let Err(err) = cli.execute() {
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_code(&err));
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map(|e| exit_codes::for_kind(e.kind()))
        .unwrap_or(exit_codes::ERROR)
}
