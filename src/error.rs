//! Error types shared by sources, the aggregator and the provider

use std::path::PathBuf;
use thiserror::Error;

/// A source failed to produce its configuration mapping.
///
/// Every variant names the source it originated from so that a failing merge
/// pass can be traced back to the offending file or variable set.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Error while reading configuration from source {source_name}: {error}")]
    Io {
        source_name: String,
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("Error while reading configuration from source {source_name}: {message}")]
    Parse { source_name: String, message: String },

    #[error(
        "Error while reading configuration from source {source_name}: \
         variable {variable} needs '{path}' to be a branch, but it already holds a value"
    )]
    PathCollision {
        source_name: String,
        variable: String,
        path: String,
    },
}

impl ConfigurationError {
    /// Identity of the source that raised the error.
    pub fn source_name(&self) -> &str {
        match self {
            ConfigurationError::Io { source_name, .. }
            | ConfigurationError::Parse { source_name, .. }
            | ConfigurationError::PathCollision { source_name, .. } => source_name,
        }
    }

    pub(crate) fn parse(source_name: impl Into<String>, message: impl ToString) -> Self {
        ConfigurationError::Parse { source_name: source_name.into(), message: message.to_string() }
    }
}

/// The provider was used after `build()` already handed out its aggregator.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Configuration provider has already been built")]
pub struct ConfigurationProvidedError;

pub type ConfigResult<T> = Result<T, ConfigurationError>;
