//! Command-line interface layer.

mod args;
mod commands;
mod credentials;
mod exit_status;
pub mod report;

use anyhow::Result;
use env_logger::Env;
use log::LevelFilter;

pub use args::{Arguments, CheckedRun, Command, InitCommand, RunCommand};
pub use credentials::{PROMPT_MARKER, PromptingProvider};
pub use exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(Arguments {
        command: Some(command),
    }) = args.with_command_or_help()
    else {
        return Ok(ExitStatus::Success);
    };

    match command {
        Command::Run(cmd) => commands::run::run(cmd),
        Command::Init(cmd) => commands::init::init(cmd),
    }
}

/// Install the `env_logger` backend. `RUST_LOG` overrides the default level.
pub fn init_logging(debug: bool) {
    let default_level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level.as_str()))
        .format_timestamp_millis()
        .try_init();
}
