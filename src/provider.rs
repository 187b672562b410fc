//! Fluent assembly of a [`MultiConfigurationSource`]

use crate::aggregate::MultiConfigurationSource;
use crate::domain::Namespace;
use crate::error::ConfigurationProvidedError;
use crate::sources::{
    CommandLineSource, ConfigurationSource, DotEnvSource, EnvironmentVariableSource,
    FileBasedSource, ParsedArguments,
};
use std::path::PathBuf;

enum ProviderState {
    Building(MultiConfigurationSource),
    Built,
}

/// Single-use builder for an aggregator.
///
/// Every `from_*` call appends sources in call order. [`build`](Self::build)
/// hands out the aggregator once; afterwards every call fails with
/// [`ConfigurationProvidedError`].
pub struct ConfigurationProvider {
    state: ProviderState,
}

pub type ProviderResult<'a> = Result<&'a mut ConfigurationProvider, ConfigurationProvidedError>;

impl Default for ConfigurationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationProvider {
    pub fn new() -> Self {
        Self { state: ProviderState::Building(MultiConfigurationSource::new()) }
    }

    /// Merge onto `existing` rather than an empty tree.
    pub fn with_target(existing: Namespace) -> Self {
        Self { state: ProviderState::Building(MultiConfigurationSource::with_target(existing)) }
    }

    /// One file source per path, created by `factory`, in the order given.
    pub fn from_configuration_files<F, S, I>(&mut self, factory: F, files: I) -> ProviderResult<'_>
    where
        F: Fn(PathBuf) -> S,
        S: FileBasedSource + 'static,
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        let aggregate = self.building()?;
        for file in files {
            aggregate.add_source(factory(file.into()));
        }
        Ok(self)
    }

    /// Environment variables under `prefix`, split by `separator` into
    /// segments and by `list_separator` into list items.
    pub fn from_os_environment(
        &mut self,
        prefix: &str,
        separator: &str,
        list_separator: &str,
    ) -> ProviderResult<'_> {
        self.from_environment(
            EnvironmentVariableSource::new(prefix)
                .separator(separator)
                .list_separator(list_separator),
        )
    }

    /// A pre-configured environment source, e.g. one with an injected reader.
    pub fn from_environment(&mut self, source: EnvironmentVariableSource) -> ProviderResult<'_> {
        self.building()?.add_source(source);
        Ok(self)
    }

    pub fn from_dotenv(&mut self, source: DotEnvSource) -> ProviderResult<'_> {
        self.building()?.add_source(source);
        Ok(self)
    }

    pub fn from_command_line<A: ParsedArguments + ?Sized>(
        &mut self,
        arguments: &A,
    ) -> ProviderResult<'_> {
        self.building()?.add_source(CommandLineSource::new(arguments));
        Ok(self)
    }

    /// Any other source.
    pub fn from_source(&mut self, source: impl ConfigurationSource + 'static) -> ProviderResult<'_> {
        self.building()?.add_source(source);
        Ok(self)
    }

    /// Hand out the assembled aggregator and retire this provider.
    pub fn build(&mut self) -> Result<MultiConfigurationSource, ConfigurationProvidedError> {
        match std::mem::replace(&mut self.state, ProviderState::Built) {
            ProviderState::Building(aggregate) => Ok(aggregate),
            ProviderState::Built => Err(ConfigurationProvidedError),
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(self.state, ProviderState::Built)
    }

    fn building(&mut self) -> Result<&mut MultiConfigurationSource, ConfigurationProvidedError> {
        match &mut self.state {
            ProviderState::Building(aggregate) => Ok(aggregate),
            ProviderState::Built => Err(ConfigurationProvidedError),
        }
    }
}
