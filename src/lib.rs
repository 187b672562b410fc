//! merge-conf: combine multiple configuration sources into one tree
//!
//! Sources (files, environment variables, dotenv files, parsed command-line
//! arguments) each produce a key/value mapping. A [`MultiConfigurationSource`]
//! merges those mappings in the order the sources were registered, so later
//! sources override earlier ones. [`ConfigurationProvider`] offers a fluent
//! way to assemble one.
//!
//! ```no_run
//! use merge_conf::{ConfigurationProvider, JsonFileSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut provider = ConfigurationProvider::new();
//! provider
//!     .from_configuration_files(|p| JsonFileSource::new(p), ["/etc/app/config.json"])?
//!     .from_os_environment("APP", "_", ",")?;
//! let mut aggregate = provider.build()?;
//! let config = aggregate.read_configuration()?;
//! println!("{:?}", config.scalar("DB.HOST"));
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod merge;
pub mod provider;
pub mod sources;

pub use aggregate::MultiConfigurationSource;
pub use discovery::AppEnvironment;
pub use domain::{ConfigMap, ConfigValue, Leaf, Namespace, Node};
pub use error::{ConfigResult, ConfigurationError, ConfigurationProvidedError};
pub use merge::merge;
pub use provider::ConfigurationProvider;
pub use sources::{
    file_source_for_path, CommandLineSource, ConfigurationSource, DotEnvSource,
    EnvironmentReader, EnvironmentVariableSource, FileBasedSource, FileSource, IniFileSource,
    JsonFileSource, MapEnvironment, OsEnvironment, ParsedArguments, TomlFileSource,
    YamlFileSource,
};
