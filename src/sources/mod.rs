//! Configuration sources
//!
//! A source produces one [`ConfigMap`] per `read()` call. Sources are not
//! expected to cache: the environment is snapshotted and files are re-read
//! every time.

use crate::domain::ConfigMap;
use crate::error::ConfigResult;
use std::path::Path;

pub mod cli;
pub mod dotenv;
pub mod env;
pub mod file;

pub use cli::{CommandLineSource, ParsedArguments};
pub use dotenv::DotEnvSource;
pub use env::{EnvironmentReader, EnvironmentVariableSource, MapEnvironment, OsEnvironment};
pub use file::{
    file_source_for_path, FileFormat, FileSource, Ini, IniFileSource, Json, JsonFileSource, Toml,
    TomlFileSource, Yaml, YamlFileSource,
};

/// Anything that can produce a configuration mapping on demand.
pub trait ConfigurationSource {
    /// Produce the mapping for this source.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ConfigurationError`] naming this source when the
    /// underlying medium is unreadable or malformed.
    fn read(&self) -> ConfigResult<ConfigMap>;

    /// Human-readable identity used in errors and logs.
    fn describe(&self) -> String;
}

impl<S: ConfigurationSource + ?Sized> ConfigurationSource for Box<S> {
    fn read(&self) -> ConfigResult<ConfigMap> {
        (**self).read()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// A source backed by a single file on disk.
pub trait FileBasedSource: ConfigurationSource {
    fn file_path(&self) -> &Path;
}
