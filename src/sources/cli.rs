//! Already-parsed command-line arguments as a configuration source

use crate::domain::{ConfigMap, ConfigValue, Leaf};
use crate::error::ConfigResult;
use crate::sources::ConfigurationSource;
use std::collections::BTreeMap;

/// A parsed argument object that can be flattened into key/value pairs.
///
/// Implementations decide which entries to expose; the command-line source
/// treats the result as a single-level mapping.
pub trait ParsedArguments {
    fn flat_values(&self) -> Vec<(String, Leaf)>;
}

/// Every argument of `Command` that clap recorded a value for, by id.
/// Multiple occurrences become a list.
///
/// The command is needed because `ArgMatches::ids()` also yields argument
/// groups, including the one derive adds for each `Parser`/`Args` struct.
impl ParsedArguments for (&clap::Command, &clap::ArgMatches) {
    fn flat_values(&self) -> Vec<(String, Leaf)> {
        let (command, matches) = *self;
        command
            .get_arguments()
            .filter_map(|arg| {
                let id = arg.get_id().as_str();
                let raw = matches.try_get_raw(id).ok()??;
                let mut values: Vec<String> =
                    raw.map(|value| value.to_string_lossy().into_owned()).collect();
                let leaf = match values.len() {
                    0 => return None,
                    1 => Leaf::Scalar(values.remove(0)),
                    _ => Leaf::List(values),
                };
                Some((id.to_string(), leaf))
            })
            .collect()
    }
}

impl ParsedArguments for BTreeMap<String, String> {
    fn flat_values(&self) -> Vec<(String, Leaf)> {
        self.iter().map(|(k, v)| (k.clone(), Leaf::Scalar(v.clone()))).collect()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> ParsedArguments for [(K, V)] {
    fn flat_values(&self) -> Vec<(String, Leaf)> {
        self.iter()
            .map(|(k, v)| (k.as_ref().to_string(), Leaf::Scalar(v.as_ref().to_string())))
            .collect()
    }
}

/// Source wrapping a flat argument mapping captured at construction.
#[derive(Debug, Clone, Default)]
pub struct CommandLineSource {
    values: ConfigMap,
}

impl CommandLineSource {
    pub fn new<A: ParsedArguments + ?Sized>(arguments: &A) -> Self {
        let values = arguments
            .flat_values()
            .into_iter()
            .map(|(key, leaf)| {
                let value = match leaf {
                    Leaf::Scalar(text) => ConfigValue::Scalar(text),
                    Leaf::List(items) => ConfigValue::List(items),
                };
                (key, value)
            })
            .collect();
        Self { values }
    }
}

impl ConfigurationSource for CommandLineSource {
    fn read(&self) -> ConfigResult<ConfigMap> {
        Ok(self.values.clone())
    }

    fn describe(&self) -> String {
        "command line arguments".to_string()
    }
}
