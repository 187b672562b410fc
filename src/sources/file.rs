//! File-backed configuration sources
//!
//! A missing file is not an error: the source simply contributes an empty
//! mapping. Structured formats are flattened into the string-only value model:
//! scalars keep their textual form, arrays become lists of item text, nulls
//! are dropped. A document whose top level is not a table is exposed under the
//! key `value`.

use crate::domain::{ConfigMap, ConfigValue};
use crate::error::{ConfigResult, ConfigurationError};
use crate::sources::{ConfigurationSource, FileBasedSource};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key under which a non-table document is stored.
const TOP_LEVEL_VALUE_KEY: &str = "value";

/// Parser for one file format.
pub trait FileFormat: Default {
    /// Short format name used when describing a source.
    const NAME: &'static str;

    /// Turn the file contents into a mapping, or describe why that failed.
    fn parse(&self, content: &str) -> Result<ConfigMap, String>;
}

/// Source reading one file in format `F`.
#[derive(Debug, Clone)]
pub struct FileSource<F> {
    path: PathBuf,
    format: F,
}

pub type JsonFileSource = FileSource<Json>;
pub type TomlFileSource = FileSource<Toml>;
pub type YamlFileSource = FileSource<Yaml>;
pub type IniFileSource = FileSource<Ini>;

impl<F: FileFormat> FileSource<F> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), format: F::default() }
    }
}

impl<F: FileFormat> ConfigurationSource for FileSource<F> {
    fn read(&self) -> ConfigResult<ConfigMap> {
        if !self.path.is_file() {
            tracing::debug!("Skipping missing config file {}", self.path.display());
            return Ok(ConfigMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|error| ConfigurationError::Io {
            source_name: self.describe(),
            path: self.path.clone(),
            error,
        })?;

        self.format.parse(&content).map_err(|message| ConfigurationError::Parse {
            source_name: self.describe(),
            message,
        })
    }

    fn describe(&self) -> String {
        format!("{} file {}", F::NAME, self.path.display())
    }
}

impl<F: FileFormat> FileBasedSource for FileSource<F> {
    fn file_path(&self) -> &Path {
        &self.path
    }
}

/// Pick a file source by extension: `json`, `toml`, `yaml`/`yml`,
/// `ini`/`conf`/`cfg`. Returns `None` for anything else.
pub fn file_source_for_path(path: &Path) -> Option<Box<dyn FileBasedSource>> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let source: Box<dyn FileBasedSource> = match ext.as_str() {
        "json" => Box::new(JsonFileSource::new(path)),
        "toml" => Box::new(TomlFileSource::new(path)),
        "yaml" | "yml" => Box::new(YamlFileSource::new(path)),
        "ini" | "conf" | "cfg" => Box::new(IniFileSource::new(path)),
        _ => return None,
    };
    Some(source)
}

fn wrap_top_level(value: Option<ConfigValue>) -> ConfigMap {
    match value {
        Some(ConfigValue::Map(map)) => map,
        Some(other) => ConfigMap::from([(TOP_LEVEL_VALUE_KEY.to_string(), other)]),
        None => ConfigMap::new(),
    }
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl FileFormat for Json {
    const NAME: &'static str = "json";

    fn parse(&self, content: &str) -> Result<ConfigMap, String> {
        let raw: serde_json::Value =
            serde_json::from_str(content).map_err(|e| format!("Invalid JSON syntax: {e}"))?;
        Ok(wrap_top_level(from_json(&raw)))
    }
}

fn from_json(value: &serde_json::Value) -> Option<ConfigValue> {
    use serde_json::Value;
    match value {
        Value::Null => None,
        Value::String(s) => Some(ConfigValue::Scalar(s.clone())),
        Value::Bool(_) | Value::Number(_) => Some(ConfigValue::Scalar(value.to_string())),
        Value::Array(items) => Some(ConfigValue::List(items.iter().map(json_item_text).collect())),
        Value::Object(entries) => Some(ConfigValue::Map(
            entries.iter().filter_map(|(k, v)| Some((k.clone(), from_json(v)?))).collect(),
        )),
    }
}

fn json_item_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// TOML
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct Toml;

impl FileFormat for Toml {
    const NAME: &'static str = "toml";

    fn parse(&self, content: &str) -> Result<ConfigMap, String> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| format!("Invalid TOML syntax: {e}"))?;
        Ok(table.iter().map(|(k, v)| (k.clone(), from_toml(v))).collect())
    }
}

fn from_toml(value: &toml::Value) -> ConfigValue {
    use toml::Value;
    match value {
        Value::String(s) => ConfigValue::Scalar(s.clone()),
        Value::Integer(i) => ConfigValue::Scalar(i.to_string()),
        Value::Float(_) => ConfigValue::Scalar(value.to_string()),
        Value::Boolean(b) => ConfigValue::Scalar(b.to_string()),
        Value::Datetime(dt) => ConfigValue::Scalar(dt.to_string()),
        Value::Array(items) => ConfigValue::List(items.iter().map(toml_item_text).collect()),
        Value::Table(table) => {
            ConfigValue::Map(table.iter().map(|(k, v)| (k.clone(), from_toml(v))).collect())
        }
    }
}

fn toml_item_text(value: &toml::Value) -> String {
    match from_toml(value) {
        ConfigValue::Scalar(text) => text,
        // Nested arrays and inline tables keep their TOML notation.
        _ => value.to_string(),
    }
}

// ============================================================================
// YAML
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct Yaml;

impl FileFormat for Yaml {
    const NAME: &'static str = "yaml";

    fn parse(&self, content: &str) -> Result<ConfigMap, String> {
        let raw: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| format!("Invalid YAML syntax: {e}"))?;
        Ok(wrap_top_level(from_yaml(&raw)))
    }
}

fn from_yaml(value: &serde_yaml::Value) -> Option<ConfigValue> {
    use serde_yaml::Value;
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(ConfigValue::Scalar(b.to_string())),
        Value::Number(n) => Some(ConfigValue::Scalar(n.to_string())),
        Value::String(s) => Some(ConfigValue::Scalar(s.clone())),
        Value::Sequence(items) => Some(ConfigValue::List(items.iter().map(yaml_item_text).collect())),
        Value::Mapping(entries) => Some(ConfigValue::Map(
            entries.iter().filter_map(|(k, v)| Some((yaml_item_text(k), from_yaml(v)?))).collect(),
        )),
        Value::Tagged(tagged) => from_yaml(&tagged.value),
    }
}

fn yaml_item_text(value: &serde_yaml::Value) -> String {
    match from_yaml(value) {
        Some(ConfigValue::Scalar(text)) => text,
        None => "null".to_string(),
        Some(_) => serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}")),
    }
}

// ============================================================================
// INI
// ============================================================================

/// INI dialect following Python's `configparser`: `[section]` headers,
/// `key = value` or `key: value` entries, `#` and `;` comment lines. Lines
/// indented deeper than their entry continue its value, joined with newlines.
/// Entries of `[DEFAULT]` are inherited by every other section and the
/// section itself is not exposed. Keys are lowercased, section names are kept
/// as written. Entries before the first header land at the top level.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ini;

const INI_DEFAULT_SECTION: &str = "DEFAULT";

impl FileFormat for Ini {
    const NAME: &'static str = "ini";

    fn parse(&self, content: &str) -> Result<ConfigMap, String> {
        // `None` holds the entries before the first header.
        let mut tables: BTreeMap<Option<String>, ConfigMap> = BTreeMap::new();
        let mut section: Option<String> = None;
        // Key and indentation of the entry that deeper lines continue.
        let mut open_entry: Option<(String, usize)> = None;
        let mut blank_run = 0;

        for (index, raw_line) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw_line.trim();
            if line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line.is_empty() {
                blank_run += 1;
                continue;
            }
            let indent = raw_line.len() - raw_line.trim_start().len();

            if let Some((key, key_indent)) = &open_entry {
                if indent > *key_indent {
                    let table = tables.entry(section.clone()).or_default();
                    if let Some(ConfigValue::Scalar(value)) = table.get_mut(key) {
                        value.push_str(&"\n".repeat(blank_run + 1));
                        value.push_str(line);
                    }
                    blank_run = 0;
                    continue;
                }
            }
            blank_run = 0;
            open_entry = None;

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let name = name.trim();
                if name.is_empty() {
                    return Err(format!("line {line_no}: empty section name"));
                }
                tables.entry(Some(name.to_string())).or_default();
                section = Some(name.to_string());
                continue;
            }

            let Some(pos) = line.find(['=', ':']) else {
                return Err(format!("line {line_no}: expected `key = value` or `[section]`"));
            };
            let key = line[..pos].trim().to_lowercase();
            let value = line[pos + 1..].trim().to_string();
            if key.is_empty() {
                return Err(format!("line {line_no}: missing key"));
            }

            let table = tables.entry(section.clone()).or_default();
            table.insert(key.clone(), ConfigValue::Scalar(value));
            open_entry = Some((key, indent));
        }

        let defaults = tables.remove(&Some(INI_DEFAULT_SECTION.to_string())).unwrap_or_default();
        let mut result = tables.remove(&None).unwrap_or_default();
        for (name, entries) in tables.into_iter().filter_map(|(name, t)| Some((name?, t))) {
            let mut merged = defaults.clone();
            merged.extend(entries);
            result.insert(name, ConfigValue::Map(merged));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn nested<'a>(map: &'a ConfigMap, path: &[&str]) -> Option<&'a ConfigValue> {
        let (last, parents) = path.split_last()?;
        let mut current = map;
        for part in parents {
            current = current.get(*part)?.as_map()?;
        }
        current.get(*last)
    }

    #[test]
    fn missing_file_yields_empty_mapping() {
        let tmp = TempDir::new().expect("tmp");
        let source = JsonFileSource::new(tmp.path().join("nope.json"));
        let mapping = source.read().expect("missing file must not error");
        assert!(mapping.is_empty());
    }

    #[test]
    fn directory_is_treated_as_missing() {
        let tmp = TempDir::new().expect("tmp");
        let mapping = TomlFileSource::new(tmp.path()).read().expect("read");
        assert!(mapping.is_empty());
    }

    #[test]
    fn json_objects_become_nested_mappings() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("c.json");
        fs::write(
            &path,
            r#"{"db": {"host": "h", "port": 5432, "tls": true, "unset": null},
                "tags": ["a", 1, {"k": "v"}]}"#,
        )
        .expect("write");

        let mapping = JsonFileSource::new(&path).read().expect("read");
        assert_eq!(nested(&mapping, &["db", "host"]), Some(&"h".into()));
        assert_eq!(nested(&mapping, &["db", "port"]), Some(&"5432".into()));
        assert_eq!(nested(&mapping, &["db", "tls"]), Some(&"true".into()));
        assert_eq!(nested(&mapping, &["db", "unset"]), None);
        assert_eq!(mapping.get("tags"), Some(&vec!["a", "1", r#"{"k":"v"}"#].into()));
    }

    #[test]
    fn json_non_object_document_is_wrapped() {
        let mapping = Json.parse("[1, 2]").expect("parse");
        assert_eq!(mapping.get("value"), Some(&vec!["1", "2"].into()));
    }

    #[test]
    fn invalid_json_reports_the_file() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{ not json").expect("write");

        let err = JsonFileSource::new(&path).read().expect_err("parse error");
        assert!(err.source_name().contains("broken.json"));
        assert!(err.to_string().contains("Invalid JSON syntax"));
    }

    #[test]
    fn toml_tables_and_arrays() {
        let mapping = Toml
            .parse("name = 'demo'\nratio = 0.5\n[server]\nports = [80, 443]\n[server.tls]\nenabled = true\n")
            .expect("parse");
        assert_eq!(mapping.get("name"), Some(&"demo".into()));
        assert_eq!(mapping.get("ratio"), Some(&"0.5".into()));

        let integral = Toml.parse("ratio = 1.0\n").expect("parse");
        assert_eq!(integral.get("ratio"), Some(&"1.0".into()));
        assert_eq!(nested(&mapping, &["server", "ports"]), Some(&vec!["80", "443"].into()));
        assert_eq!(nested(&mapping, &["server", "tls", "enabled"]), Some(&"true".into()));
    }

    #[test]
    fn yaml_mappings_sequences_and_empty_documents() {
        let mapping = Yaml
            .parse("db:\n  host: h\n  replicas:\n    - r1\n    - r2\n3: numeric-key\nnothing: ~\n")
            .expect("parse");
        assert_eq!(nested(&mapping, &["db", "host"]), Some(&"h".into()));
        assert_eq!(nested(&mapping, &["db", "replicas"]), Some(&vec!["r1", "r2"].into()));
        assert_eq!(mapping.get("3"), Some(&"numeric-key".into()));
        assert!(!mapping.contains_key("nothing"));

        assert!(Yaml.parse("").expect("empty document").is_empty());
        assert_eq!(Yaml.parse("just text").expect("parse").get("value"), Some(&"just text".into()));
    }

    #[test]
    fn ini_sections_become_mappings() {
        let mapping = Ini
            .parse("; comment\ntop = level\n[Server]\nHost = example.org\nport: 8080\n\n# done\n")
            .expect("parse");
        assert_eq!(mapping.get("top"), Some(&"level".into()));
        assert_eq!(nested(&mapping, &["Server", "host"]), Some(&"example.org".into()));
        assert_eq!(nested(&mapping, &["Server", "port"]), Some(&"8080".into()));
    }

    #[test]
    fn ini_indented_lines_continue_the_value() {
        let mapping = Ini
            .parse("[s]\nhosts = a\n  b\n\n  c\n# note\nnext = 1\n")
            .expect("parse");
        assert_eq!(nested(&mapping, &["s", "hosts"]), Some(&"a\nb\n\nc".into()));
        assert_eq!(nested(&mapping, &["s", "next"]), Some(&"1".into()));
    }

    #[test]
    fn ini_default_section_is_inherited() {
        let mapping = Ini
            .parse("[DEFAULT]\nx = 1\ny = base\n[s]\ny = 2\n[t]\n")
            .expect("parse");
        assert_eq!(nested(&mapping, &["s", "x"]), Some(&"1".into()));
        assert_eq!(nested(&mapping, &["s", "y"]), Some(&"2".into()));
        assert_eq!(nested(&mapping, &["t", "y"]), Some(&"base".into()));
        assert!(!mapping.contains_key("DEFAULT"));
    }

    #[test]
    fn ini_rejects_garbage_lines() {
        let err = Ini.parse("[s]\njust words\n").expect_err("garbage");
        assert!(err.contains("line 2"));
    }

    #[test]
    fn source_selection_by_extension() {
        let names: Vec<String> = ["a.json", "b.TOML", "c.yml", "d.conf", "e.txt"]
            .iter()
            .map(|p| {
                file_source_for_path(Path::new(p))
                    .map(|s| s.describe())
                    .unwrap_or_else(|| "none".to_string())
            })
            .collect();
        assert_eq!(
            names,
            vec!["json file a.json", "toml file b.TOML", "yaml file c.yml", "ini file d.conf", "none"]
        );
    }
}
