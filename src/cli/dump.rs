//! Dump command implementation

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use merge_conf::discovery::{AppEnvironment, DEFAULT_CONFIG_EXT, DEFAULT_CONFIG_NAME};
use merge_conf::{
    file_source_for_path, ConfigurationProvider, DotEnvSource, EnvironmentVariableSource,
    FileBasedSource, Namespace,
};
use std::path::PathBuf;

use super::utils::parse_key_value;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Toml,
}

#[derive(Args)]
pub struct DumpArgs {
    /// Configuration file to merge (repeatable, later files win)
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Merge existing candidate files for this application name first
    #[arg(long, value_name = "APP")]
    pub discover: Option<String>,

    /// File extension used for discovered candidates
    #[arg(long, value_name = "EXT", default_value = DEFAULT_CONFIG_EXT, requires = "discover")]
    pub ext: String,

    /// Dotenv file laid over the environment (requires --env-prefix)
    #[arg(long, value_name = "PATH", requires = "env_prefix")]
    pub dotenv: Option<PathBuf>,

    /// Merge environment variables starting with this prefix
    #[arg(short = 'p', long, env = "MERGE_CONF_PREFIX", value_name = "PREFIX")]
    pub env_prefix: Option<String>,

    /// Separator between path segments in variable names
    #[arg(long, value_name = "SEP", default_value = "_")]
    pub separator: String,

    /// Separator between list items in variable values
    #[arg(long, value_name = "SEP", default_value = ",")]
    pub list_separator: String,

    /// Override a top-level key (repeatable, wins over everything else)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

pub fn run(args: DumpArgs) -> Result<()> {
    let mut files: Vec<PathBuf> = Vec::new();
    if let Some(app) = &args.discover {
        let entry_point = std::env::current_dir()?.join(app);
        let discovered = AppEnvironment::new(entry_point)
            .existing_config_files(&args.ext, DEFAULT_CONFIG_NAME);
        tracing::debug!("Discovered {} config files for {}", discovered.len(), app);
        files.extend(discovered);
    }
    files.extend(args.files.iter().cloned());

    let file_sources = files
        .iter()
        .map(|path| {
            file_source_for_path(path).with_context(|| {
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
                format!("Unsupported config extension '.{}' for file {}", ext, path.display())
            })
        })
        .collect::<Result<Vec<Box<dyn FileBasedSource>>>>()?;

    let mut provider = ConfigurationProvider::new();
    for source in file_sources {
        provider.from_source(source)?;
    }

    // The dotenv source already includes the live environment, with live
    // variables taking precedence over file entries.
    match (&args.env_prefix, &args.dotenv) {
        (Some(prefix), Some(env_file)) => {
            provider.from_dotenv(
                DotEnvSource::new(prefix.as_str())
                    .env_file(env_file)
                    .separator(args.separator.as_str())
                    .list_separator(args.list_separator.as_str()),
            )?;
        }
        (Some(prefix), None) => {
            provider.from_environment(
                EnvironmentVariableSource::new(prefix.as_str())
                    .separator(args.separator.as_str())
                    .list_separator(args.list_separator.as_str()),
            )?;
        }
        (None, _) => {}
    }

    if !args.set.is_empty() {
        provider.from_command_line(args.set.as_slice())?;
    }

    let mut aggregate = provider.build()?;
    let config = aggregate.read_configuration().context("Failed to read configuration")?;

    println!("{}", render(config, args.format)?);
    Ok(())
}

fn render(config: &Namespace, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(config)?,
        OutputFormat::Yaml => serde_yaml::to_string(config)?,
        OutputFormat::Toml => toml::to_string_pretty(config)?,
    };
    Ok(text.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Namespace {
        let mut ns = Namespace::new();
        ns.set("name", "demo");
        ns.set_path(&["db", "host"], "localhost");
        ns.set_path(&["db", "ports"], vec!["5432".to_string(), "5433".to_string()]);
        ns
    }

    #[test]
    fn renders_json() {
        insta::assert_snapshot!(render(&sample(), OutputFormat::Json).expect("json"), @r###"
        {
          "db": {
            "host": "localhost",
            "ports": [
              "5432",
              "5433"
            ]
          },
          "name": "demo"
        }
        "###);
    }

    #[test]
    fn renders_toml_with_tables() {
        let text = render(&sample(), OutputFormat::Toml).expect("toml");
        let parsed: toml::Table = toml::from_str(&text).expect("valid toml");
        assert_eq!(parsed["name"].as_str(), Some("demo"));
        assert_eq!(parsed["db"]["host"].as_str(), Some("localhost"));
    }

    #[test]
    fn renders_yaml() {
        let text = render(&sample(), OutputFormat::Yaml).expect("yaml");
        let parsed: serde_yaml::Value = serde_yaml::from_str(&text).expect("valid yaml");
        assert_eq!(parsed["db"]["ports"][1].as_str(), Some("5433"));
    }
}
