//! # devflame - Main Entry Point
//!
//! Parses arguments, wires the real process runner and `PATH` lookup into a
//! [`Session`], and maps failures to exit codes.

use anyhow::Result;
use clap::Parser;
use std::io::{self, BufReader};

use devflame::cli::Args;
use devflame::config::SessionConfig;
use devflame::domain::SessionError;
use devflame::mode::{Presets, Prompter};
use devflame::preflight::PathLocator;
use devflame::runner::SystemRunner;
use devflame::session::recording::spawn_keyboard_listener;
use devflame::session::Session;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_NO_MATCH: i32 = 3;
const EXIT_MISSING_TOOL: i32 = 127;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SessionError>() {
        Some(SessionError::MissingPrerequisites(_)) => EXIT_MISSING_TOOL,
        Some(SessionError::InvalidMode(_) | SessionError::EmptyInput(_)) => EXIT_USAGE,
        Some(SessionError::NoMatchingProcess(_)) => EXIT_NO_MATCH,
        _ => EXIT_ERROR,
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = SessionConfig::from_args(&args);
    let presets = Presets { mode: args.mode, app: args.app, process: args.process };

    if !config.quiet {
        println!("devflame v{}", env!("CARGO_PKG_VERSION"));
        println!("bridge: {}", config.bridge_kind());
    }

    let mut runner = SystemRunner;
    let locator = PathLocator;
    let mut session = Session::new(config, &mut runner, &locator);

    // One reader for both the prompts and the stop key, so typed-ahead lines survive
    let prompter = Prompter::new(BufReader::new(io::stdin()), io::stdout());
    let report = session.run(prompter, &presets, |input, signal| {
        spawn_keyboard_listener(input, signal);
    })?;

    log::info!("{}: {}", report.stop_reason, report.record_command);
    Ok(())
}
