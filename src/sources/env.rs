//! Environment variables as a configuration source
//!
//! With prefix `MYAPP` and separator `_`, the variable `MYAPP_DB_HOST` ends up
//! at `DB.HOST`. Values containing the list separator become lists.
//!
//! Prefix stripping removes the leading run of characters that occur anywhere
//! in the prefix, not the literal prefix string. With prefix `DB`, the name
//! `DBBACKUP` decomposes to `ACKUP`, because the second `B` also belongs to the
//! prefix's character set. A single separator left over after stripping is
//! dropped.

use crate::domain::{ConfigMap, ConfigValue};
use crate::error::{ConfigResult, ConfigurationError};
use crate::sources::ConfigurationSource;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub const DEFAULT_SEPARATOR: &str = "_";
pub const DEFAULT_LIST_SEPARATOR: &str = ",";

// ============================================================================
// EnvironmentReader
// ============================================================================

/// Abstraction over the process environment so sources can be tested
/// without touching the real one.
pub trait EnvironmentReader {
    /// Value of a single variable.
    fn get(&self, name: &str) -> Option<String>;

    /// Every variable currently visible.
    fn vars(&self) -> Box<dyn Iterator<Item = (String, String)> + '_>;
}

/// Reads the real process environment. Variables whose name or value is not
/// valid unicode are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEnvironment;

impl EnvironmentReader for OsEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn vars(&self) -> Box<dyn Iterator<Item = (String, String)> + '_> {
        Box::new(std::env::vars_os().filter_map(|(name, value)| {
            Some((name.into_string().ok()?, value.into_string().ok()?))
        }))
    }
}

/// In-memory environment. Clones share one table, so a test can keep a
/// handle and mutate variables after a source has taken its own copy.
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { vars: Rc::new(RefCell::new(vars)) }
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.borrow_mut().insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.vars.borrow_mut().remove(name)
    }
}

impl EnvironmentReader for MapEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.borrow().get(name).cloned()
    }

    fn vars(&self) -> Box<dyn Iterator<Item = (String, String)> + '_> {
        let snapshot: Vec<(String, String)> =
            self.vars.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        Box::new(snapshot.into_iter())
    }
}

// ============================================================================
// Name decomposition
// ============================================================================

/// Prefix and separators shared by every source that turns flat variable
/// names into nested mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyLayout {
    pub(crate) prefix: String,
    pub(crate) separator: String,
    pub(crate) list_separator: String,
}

impl KeyLayout {
    pub(crate) fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: DEFAULT_SEPARATOR.to_string(),
            list_separator: DEFAULT_LIST_SEPARATOR.to_string(),
        }
    }

    /// Decompose every variable whose name starts with the prefix.
    ///
    /// Variables are visited in name order so that collisions are reported
    /// the same way on every run.
    pub(crate) fn decompose(
        &self,
        source_name: &str,
        vars: BTreeMap<String, String>,
    ) -> ConfigResult<ConfigMap> {
        let mut result = ConfigMap::new();

        for (name, value) in &vars {
            if !name.starts_with(self.prefix.as_str()) {
                continue;
            }

            let segments = self.segments(name);
            let Some((last, parents)) = segments.split_last() else {
                tracing::trace!("Skipping {}: nothing left after prefix stripping", name);
                continue;
            };

            let mut items = &mut result;
            for (depth, part) in parents.iter().enumerate() {
                let slot = items
                    .entry((*part).to_string())
                    .or_insert_with(|| ConfigValue::Map(ConfigMap::new()));
                items = slot.as_map_mut().ok_or_else(|| ConfigurationError::PathCollision {
                    source_name: source_name.to_string(),
                    variable: name.clone(),
                    path: parents[..=depth].join(self.separator.as_str()),
                })?;
            }

            items.insert((*last).to_string(), self.value(value));
        }

        Ok(result)
    }

    fn segments<'n>(&self, name: &'n str) -> Vec<&'n str> {
        let stripped = name.trim_start_matches(|c: char| self.prefix.contains(c));
        if self.separator.is_empty() {
            return if stripped.is_empty() { Vec::new() } else { vec![stripped] };
        }

        let stripped = stripped.strip_prefix(self.separator.as_str()).unwrap_or(stripped);
        if stripped.is_empty() {
            return Vec::new();
        }
        stripped.split(self.separator.as_str()).collect()
    }

    fn value(&self, raw: &str) -> ConfigValue {
        if !self.list_separator.is_empty() && raw.contains(self.list_separator.as_str()) {
            ConfigValue::List(raw.split(self.list_separator.as_str()).map(str::to_string).collect())
        } else {
            ConfigValue::Scalar(raw.to_string())
        }
    }
}

// ============================================================================
// EnvironmentVariableSource
// ============================================================================

/// Source that snapshots the environment on every read.
pub struct EnvironmentVariableSource {
    layout: KeyLayout,
    reader: Box<dyn EnvironmentReader>,
}

impl EnvironmentVariableSource {
    /// Source over the process environment with the default separators.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { layout: KeyLayout::new(prefix), reader: Box::new(OsEnvironment) }
    }

    /// Separator between path segments in a variable name (default `_`).
    /// An empty separator keeps the whole remainder as one key.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.layout.separator = separator.into();
        self
    }

    /// Separator between list items in a value (default `,`). An empty
    /// separator disables list splitting.
    pub fn list_separator(mut self, list_separator: impl Into<String>) -> Self {
        self.layout.list_separator = list_separator.into();
        self
    }

    /// Read variables from `reader` instead of the process environment.
    pub fn with_reader(mut self, reader: impl EnvironmentReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.layout.prefix
    }
}

impl ConfigurationSource for EnvironmentVariableSource {
    fn read(&self) -> ConfigResult<ConfigMap> {
        let snapshot: BTreeMap<String, String> = self.reader.vars().collect();
        let mapping = self.layout.decompose(&self.describe(), snapshot)?;
        tracing::debug!("{} produced {} top-level keys", self.describe(), mapping.len());
        Ok(mapping)
    }

    fn describe(&self) -> String {
        format!("environment variables (prefix '{}')", self.layout.prefix)
    }
}
