//! `.env` files as a configuration source
//!
//! The file is parsed with `dotenvy` and laid over a snapshot of the
//! environment; the process environment itself is never modified. The
//! combined table then goes through the same name decomposition as
//! [`EnvironmentVariableSource`](super::EnvironmentVariableSource).
//!
//! Without an explicit path, the first `.env` found in the working directory
//! or one of its ancestors is used, as `dotenvy::dotenv()` does.

use crate::domain::ConfigMap;
use crate::error::{ConfigResult, ConfigurationError};
use crate::sources::env::{EnvironmentReader, KeyLayout, OsEnvironment};
use crate::sources::{ConfigurationSource, FileBasedSource};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEFAULT_ENV_FILE: &str = ".env";

pub struct DotEnvSource {
    layout: KeyLayout,
    env_file: Option<PathBuf>,
    override_existing: bool,
    reader: Box<dyn EnvironmentReader>,
}

impl DotEnvSource {
    /// Source reading the nearest `.env` upwards from the working directory.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            layout: KeyLayout::new(prefix),
            env_file: None,
            override_existing: false,
            reader: Box::new(OsEnvironment),
        }
    }

    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Let file entries win over variables already set in the environment.
    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.layout.separator = separator.into();
        self
    }

    pub fn list_separator(mut self, list_separator: impl Into<String>) -> Self {
        self.layout.list_separator = list_separator.into();
        self
    }

    pub fn with_reader(mut self, reader: impl EnvironmentReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    fn resolve_file(&self) -> Option<PathBuf> {
        match &self.env_file {
            Some(path) => path.is_file().then(|| path.clone()),
            None => std::env::current_dir().ok().and_then(|dir| find_env_file(&dir)),
        }
    }

    fn file_entries(&self) -> ConfigResult<Vec<(String, String)>> {
        let Some(path) = self.resolve_file() else {
            tracing::debug!("No dotenv file at {}", self.file_path().display());
            return Ok(Vec::new());
        };

        let iter = dotenvy::from_path_iter(&path).map_err(|e| self.error(&path, e))?;
        iter.map(|item| item.map_err(|e| self.error(&path, e))).collect()
    }

    fn error(&self, path: &Path, error: dotenvy::Error) -> ConfigurationError {
        match error {
            dotenvy::Error::Io(error) => ConfigurationError::Io {
                source_name: self.describe(),
                path: path.to_path_buf(),
                error,
            },
            other => ConfigurationError::parse(self.describe(), other),
        }
    }
}

/// First `.env` in `start` or one of its ancestors.
fn find_env_file(start: &Path) -> Option<PathBuf> {
    start.ancestors().map(|dir| dir.join(DEFAULT_ENV_FILE)).find(|path| path.is_file())
}

impl ConfigurationSource for DotEnvSource {
    fn read(&self) -> ConfigResult<ConfigMap> {
        let mut table: BTreeMap<String, String> = self.reader.vars().collect();
        for (name, value) in self.file_entries()? {
            if self.override_existing || !table.contains_key(&name) {
                table.insert(name, value);
            }
        }
        self.layout.decompose(&self.describe(), table)
    }

    fn describe(&self) -> String {
        format!("dotenv file {}", self.file_path().display())
    }
}

impl FileBasedSource for DotEnvSource {
    fn file_path(&self) -> &Path {
        self.env_file.as_deref().unwrap_or(Path::new(DEFAULT_ENV_FILE))
    }
}
