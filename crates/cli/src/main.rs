//! Imported framework processor.
//!
//! This binary is a thin wrapper around `framework-core` (exposed in code as
//! `framework_core`). It parses flags, sets up logging, and turns the pipeline
//! result into an exit status: 0 on success, the signer's own status when
//! signing fails, 1 for everything else.

use std::process;

use clap::Parser;
use framework_processor::commands::{process_framework_command, ProcessArgs};

fn main() {
    // Logging is controlled by RUST_LOG.
    env_logger::init();

    let args = ProcessArgs::parse();
    let exit_code = match process_framework_command(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };

    process::exit(exit_code);
}
