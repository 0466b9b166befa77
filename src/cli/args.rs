//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `run`: Build per-platform agent lists for the target subscription
//! - `init`: Write a template configuration file

use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::config::CONFIG_FILE_NAME;
use crate::error::{MigrationError, Result};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn debug(&self) -> bool {
        match &self.command {
            Some(Command::Run(cmd)) => cmd.debug,
            Some(Command::Init(_)) | None => false,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build Windows, Linux and incompatible agent lists for each target activation key
    Run(RunCommand),
    /// Write a template configuration file
    Init(InitCommand),
}

#[derive(Debug, Args)]
pub struct RunCommand {
    /// Username for source subscription
    #[arg(short = 'u', long)]
    pub source_user: Option<String>,

    /// Password for source subscription (use "-" to enter password interactively)
    #[arg(
        short = 'p',
        long,
        env = "CA_MIGRATE_SOURCE_PASSWORD",
        hide_env_values = true
    )]
    pub source_password: Option<String>,

    /// Username for target subscription
    #[arg(short = 'U', long)]
    pub target_user: Option<String>,

    /// Password for target subscription (use "-" to enter password interactively)
    #[arg(
        short = 'P',
        long,
        env = "CA_MIGRATE_TARGET_PASSWORD",
        hide_env_values = true
    )]
    pub target_password: Option<String>,

    /// Connect to the platform through a proxy
    #[arg(long)]
    pub enable_proxy: bool,

    /// Proxy URL (e.g. https://10.10.10.10:8080)
    #[arg(long)]
    pub proxy_url: Option<String>,

    /// Enable debugging output
    #[arg(long)]
    pub debug: bool,

    /// Configuration file
    #[arg(long)]
    pub config_file: Option<PathBuf>,

    /// Validate target activation keys are compatible with source activation keys
    #[arg(long)]
    pub validate_activation_keys: bool,

    /// Directory the agent lists are written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl RunCommand {
    /// Check required arguments, in the order they are reported.
    pub fn check(&self) -> Result<CheckedRun<'_>> {
        let source_user = require(&self.source_user, "Source username is required")?;
        let target_user = require(&self.target_user, "Target username is required")?;
        let source_password = require(&self.source_password, "Source password is required")?;
        let target_password = require(&self.target_password, "Target password is required")?;

        if self.enable_proxy && self.proxy_url.as_deref().is_none_or(str::is_empty) {
            return Err(MigrationError::argument(
                "--enable-proxy also requires --proxy-url",
            ));
        }

        let config_file = self
            .config_file
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(|| MigrationError::argument("No configuration file specified"))?;
        if !config_file.exists() {
            return Err(MigrationError::argument(format!(
                "Configuration file not found ({})",
                config_file.display()
            )));
        }

        Ok(CheckedRun {
            source_user,
            source_password,
            target_user,
            target_password,
            config_file,
        })
    }

    /// Proxy to use, if enabled.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy_url.as_deref().filter(|_| self.enable_proxy)
    }
}

/// `run` arguments that passed [`RunCommand::check`].
#[derive(Debug)]
pub struct CheckedRun<'a> {
    pub source_user: &'a str,
    pub source_password: &'a str,
    pub target_user: &'a str,
    pub target_password: &'a str,
    pub config_file: &'a Path,
}

fn require<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(MigrationError::argument(message)),
    }
}

#[derive(Debug, Args)]
pub struct InitCommand {
    /// Path of the configuration file to create
    #[arg(default_value = CONFIG_FILE_NAME)]
    pub path: PathBuf,
}
