use std::process::ExitCode;

use crate::error::MigrationError;

/// Exit status of the CLI. The numeric values are relied on by scripts.
///
/// - `Success` (0): lists written
/// - `ArgumentError` (1): missing or invalid command-line input
/// - `ConfigError` (2): invalid configuration document
/// - `Failure` (3): transport, output or other runtime failure
/// - `KeyLookupError` (4): a mapped key does not exist
/// - `KeyIncompatible` (5): source and target keys are not compatible
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    ArgumentError,
    ConfigError,
    Failure,
    KeyLookupError,
    KeyIncompatible,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::ArgumentError => 1,
            ExitStatus::ConfigError => 2,
            ExitStatus::Failure => 3,
            ExitStatus::KeyLookupError => 4,
            ExitStatus::KeyIncompatible => 5,
        }
    }

    /// Status for an error escaping a command.
    pub fn from_error(err: &anyhow::Error) -> Self {
        err.downcast_ref::<MigrationError>()
            .map(Self::from)
            .unwrap_or(ExitStatus::Failure)
    }
}

impl From<&MigrationError> for ExitStatus {
    fn from(err: &MigrationError) -> Self {
        match err {
            MigrationError::Argument(_) => ExitStatus::ArgumentError,
            MigrationError::Configuration(_) => ExitStatus::ConfigError,
            MigrationError::UnknownSourceKey { .. } | MigrationError::UnknownTargetKey { .. } => {
                ExitStatus::KeyLookupError
            }
            MigrationError::KeyIncompatible { .. } => ExitStatus::KeyIncompatible,
            MigrationError::Transport(_) | MigrationError::Output { .. } => ExitStatus::Failure,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}
