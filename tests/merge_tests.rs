//! End-to-end merge behaviour through the public API

use merge_conf::{
    ConfigMap, ConfigResult, ConfigValue, ConfigurationProvidedError, ConfigurationProvider,
    ConfigurationSource, EnvironmentVariableSource, JsonFileSource, MapEnvironment,
    MultiConfigurationSource, Namespace, Node, YamlFileSource,
};
use similar_asserts::assert_eq;
use std::fs;
use tempfile::TempDir;

struct Fixed(ConfigMap);

impl ConfigurationSource for Fixed {
    fn read(&self) -> ConfigResult<ConfigMap> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "fixed".to_string()
    }
}

fn map(entries: Vec<(&str, ConfigValue)>) -> ConfigMap {
    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn environment_scenario_from_documentation() {
    let env = MapEnvironment::from_pairs([
        ("APP_DB_HOST", "localhost"),
        ("APP_DB_PORTS", "5432,5433"),
        ("OTHER", "x"),
    ]);

    let mut provider = ConfigurationProvider::new();
    provider
        .from_environment(EnvironmentVariableSource::new("APP").with_reader(env))
        .expect("environment");
    let mut aggregate = provider.build().expect("build");
    let config = aggregate.read_configuration().expect("read");

    assert_eq!(config.scalar("DB.HOST"), Some("localhost"));
    assert_eq!(
        config.list("DB.PORTS").map(|ports| ports.to_vec()),
        Some(vec!["5432".to_string(), "5433".to_string()])
    );
    assert_eq!(config.len(), 1);
}

#[test]
fn folding_matches_manual_left_to_right_merge() {
    let first = map(vec![("a", "1".into()), ("shape", map(vec![("x", "1".into())]).into())]);
    let second = map(vec![("b", "2".into()), ("shape", "flat".into())]);
    let third = map(vec![("a", "3".into())]);

    let mut aggregate = MultiConfigurationSource::new();
    for mapping in [&first, &second, &third] {
        aggregate.add_source(Fixed(mapping.clone()));
    }
    let folded = aggregate.read_configuration().expect("read").clone();

    let mut manual = Namespace::new();
    for mapping in [&first, &second, &third] {
        merge_conf::merge(mapping, &mut manual);
    }

    assert_eq!(folded, manual);
    assert_eq!(folded.scalar("a"), Some("3"));
    assert_eq!(folded.scalar("shape"), Some("flat"));
}

#[test]
fn nested_keys_are_replaced_not_unioned() {
    let mut aggregate = MultiConfigurationSource::new();
    aggregate.add_source(Fixed(map(vec![("a", map(vec![("b", "1".into())]).into())])));
    aggregate.add_source(Fixed(map(vec![("a", map(vec![("c", "2".into())]).into())])));

    let config = aggregate.read_configuration().expect("read");
    let a = config.get("a").and_then(Node::as_branch).expect("branch");
    assert_eq!(a.keys().collect::<Vec<_>>(), vec!["c"]);
}

#[test]
fn second_pass_is_stable_without_collisions() {
    let mut aggregate = MultiConfigurationSource::new();
    aggregate.add_source(Fixed(map(vec![("a", map(vec![("b", "1".into())]).into())])));
    aggregate.add_source(Fixed(map(vec![("c", vec!["x", "y"].into())])));

    let first = aggregate.read_configuration().expect("first").clone();
    let second = aggregate.read_configuration().expect("second").clone();
    assert_eq!(first, second);
}

#[test]
fn provider_is_single_use() {
    let mut provider = ConfigurationProvider::new();
    provider.build().expect("first build");

    assert_eq!(provider.build().err(), Some(ConfigurationProvidedError));
    assert!(provider.from_os_environment("APP", "_", ",").is_err());
}

#[test]
fn files_then_environment_precedence() {
    let tmp = TempDir::new().expect("tmp");
    let json = tmp.path().join("base.json");
    let yaml = tmp.path().join("override.yaml");
    let missing = tmp.path().join("missing.json");
    fs::write(&json, r#"{"server": {"port": "80", "host": "a"}, "mode": "base"}"#).expect("write");
    fs::write(&yaml, "mode: override\n").expect("write");

    let env = MapEnvironment::from_pairs([("SVC_server_port", "8080")]);

    let mut provider = ConfigurationProvider::new();
    provider
        .from_configuration_files(|p| JsonFileSource::new(p), [&json, &missing])
        .and_then(|p| p.from_configuration_files(|p| YamlFileSource::new(p), [&yaml]))
        .and_then(|p| p.from_environment(EnvironmentVariableSource::new("SVC").with_reader(env)))
        .expect("assemble");

    let mut aggregate = provider.build().expect("build");
    let config = aggregate.read_configuration().expect("read");

    assert_eq!(config.scalar("mode"), Some("override"));
    // The environment brings its own `server` branch, replacing the file's.
    assert_eq!(config.scalar("server.port"), Some("8080"));
    assert_eq!(config.scalar("server.host"), None);
}
