//! Error taxonomy for a migration run.
//!
//! Every variant is terminal: the run stops at the first failure and nothing
//! is written for later phases. The CLI maps each variant to a distinct exit
//! code (see `cli::ExitStatus`).

use std::io;

use thiserror::Error;

use crate::api::TransportError;

pub type Result<T, E = MigrationError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum MigrationError {
    /// Missing or invalid command-line input (credentials, proxy, config path).
    #[error("{0}")]
    Argument(String),

    /// Malformed or incomplete configuration document.
    #[error("config error: {0}")]
    Configuration(String),

    /// A source key name referenced by the run does not exist in the source account.
    #[error("source key \"{name}\" does not exist in source key data")]
    UnknownSourceKey { name: String },

    /// A target key name referenced by the run does not exist in the target account.
    #[error("target key \"{name}\" does not exist in target key data")]
    UnknownTargetKey { name: String },

    #[error(
        "target key \"{target_key}\" does not match source key \"{source_key}\" (`{field}` differs)"
    )]
    KeyIncompatible {
        source_key: String,
        target_key: String,
        field: &'static str,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to write output list {label}: {source}")]
    Output {
        label: String,
        #[source]
        source: io::Error,
    },
}

impl MigrationError {
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
