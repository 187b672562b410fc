//! Ordered multi-source aggregation

use crate::domain::Namespace;
use crate::error::ConfigResult;
use crate::merge::merge;
use crate::sources::ConfigurationSource;

/// Ordered set of sources merged onto one target tree.
///
/// Sources are applied in the order they were added, so later sources take
/// precedence. The list is append-only. The target is never reset: every
/// call to [`read_configuration`](Self::read_configuration) merges all sources
/// again on top of the current tree, and a failing source leaves the effects
/// of the sources before it in place.
#[derive(Default)]
pub struct MultiConfigurationSource {
    target: Namespace,
    sources: Vec<Box<dyn ConfigurationSource>>,
}

impl MultiConfigurationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge onto an existing tree instead of an empty one.
    pub fn with_target(target: Namespace) -> Self {
        Self { target, sources: Vec::new() }
    }

    pub fn add_source(&mut self, source: impl ConfigurationSource + 'static) {
        self.sources.push(Box::new(source));
    }

    /// Append `source` if present; `None` is ignored.
    pub fn add_optional_source(&mut self, source: Option<Box<dyn ConfigurationSource>>) {
        if let Some(source) = source {
            self.sources.push(source);
        }
    }

    pub fn add_sources<I>(&mut self, sources: I)
    where
        I: IntoIterator<Item = Box<dyn ConfigurationSource>>,
    {
        self.sources.extend(sources);
    }

    /// Run one merge pass over all sources, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first source that fails to read and returns its error.
    /// Sources before it have already been merged into the target.
    pub fn read_configuration(&mut self) -> ConfigResult<&Namespace> {
        for source in &self.sources {
            let name = source.describe();
            tracing::debug!("Reading configuration from {}", name);
            let values = source.read().inspect_err(|e| {
                tracing::debug!("Aborting merge pass: {}", e);
            })?;
            tracing::debug!("Merging {} top-level keys from {}", values.len(), name);
            merge(&values, &mut self.target);
        }
        Ok(&self.target)
    }

    pub fn target(&self) -> &Namespace {
        &self.target
    }

    pub fn into_target(self) -> Namespace {
        self.target
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Descriptions of the registered sources, in precedence order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.describe()).collect()
    }
}

impl std::fmt::Debug for MultiConfigurationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiConfigurationSource")
            .field("target", &self.target)
            .field("sources", &self.source_names())
            .finish()
    }
}
