//! Candidate configuration file discovery
//!
//! Produces the ordered list of places an application's configuration file
//! may live, from system-wide to application-local. Feed the result to
//! [`ConfigurationProvider::from_configuration_files`](crate::ConfigurationProvider::from_configuration_files)
//! so that more specific locations override more general ones.

use crate::sources::{EnvironmentReader, OsEnvironment};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_EXT: &str = ".conf";
pub const DEFAULT_CONFIG_NAME: &str = "config";

const DEFAULT_XDG_CONFIG_DIRS: &str = "/etc/xdg";

/// Where the running application lives and where its configuration may be.
pub struct AppEnvironment {
    entry_point: PathBuf,
    home_dir: Option<PathBuf>,
    config_home: Option<PathBuf>,
    reader: Box<dyn EnvironmentReader>,
}

impl AppEnvironment {
    pub fn new(entry_point: impl Into<PathBuf>) -> Self {
        Self {
            entry_point: entry_point.into(),
            home_dir: dirs::home_dir(),
            config_home: dirs::config_dir(),
            reader: Box::new(OsEnvironment),
        }
    }

    /// Environment for the currently running executable.
    pub fn current() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    pub fn home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home.into());
        self
    }

    /// Per-user configuration directory (`$XDG_CONFIG_HOME` on Linux).
    pub fn config_home(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_home = Some(dir.into());
        self
    }

    /// Read `XDG_CONFIG_DIRS` from `reader` instead of the process environment.
    pub fn with_reader(mut self, reader: impl EnvironmentReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    /// Application name: the entry point's file name without extension.
    pub fn app_name(&self) -> String {
        self.entry_point
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory containing the entry point.
    pub fn app_path(&self) -> &Path {
        self.entry_point.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Every location that may hold a configuration file, least specific first.
    ///
    /// Each directory contributes `<app><ext>` followed by `<default_name><ext>`.
    pub fn config_file_candidates(&self, ext: &str, default_name: &str) -> Vec<PathBuf> {
        let app = self.app_name();
        let file_names = [format!("{app}{ext}"), format!("{default_name}{ext}")];
        let mut dirs: Vec<PathBuf> = Vec::new();

        if cfg!(unix) {
            dirs.push(Path::new("/etc").join(&app));
            let xdg_dirs = self
                .reader
                .get("XDG_CONFIG_DIRS")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_XDG_CONFIG_DIRS.to_string());
            dirs.extend(
                xdg_dirs.split(':').filter(|d| !d.is_empty()).map(|d| Path::new(d).join(&app)),
            );
        }
        if let Some(config_home) = &self.config_home {
            dirs.push(config_home.join(&app));
        }
        if let Some(home) = &self.home_dir {
            dirs.push(home.join(format!(".{app}")));
        }
        dirs.push(self.app_path().to_path_buf());

        dirs.iter()
            .flat_map(|dir| file_names.iter().map(move |name| dir.join(name)))
            .collect()
    }

    /// The candidates that exist as regular files, in the same order.
    pub fn existing_config_files(&self, ext: &str, default_name: &str) -> Vec<PathBuf> {
        self.config_file_candidates(ext, default_name)
            .into_iter()
            .filter(|path| path.is_file())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MapEnvironment;
    use std::fs;
    use tempfile::TempDir;

    fn environment(root: &Path, xdg_dirs: &str) -> AppEnvironment {
        AppEnvironment::new(root.join("bin").join("tool.py"))
            .home_dir(root.join("home"))
            .config_home(root.join("home").join(".config"))
            .with_reader(MapEnvironment::from_pairs([("XDG_CONFIG_DIRS", xdg_dirs)]))
    }

    #[test]
    fn app_name_and_path_come_from_entry_point() {
        let env = AppEnvironment::new("/opt/tools/tool.py");
        assert_eq!(env.app_name(), "tool");
        assert_eq!(env.app_path(), Path::new("/opt/tools"));
    }

    #[cfg(unix)]
    #[test]
    fn candidates_run_from_system_to_local() {
        let root = Path::new("/r");
        let env = environment(root, "/x1:/x2");
        let candidates = env.config_file_candidates(DEFAULT_CONFIG_EXT, DEFAULT_CONFIG_NAME);

        let expected: Vec<PathBuf> = [
            "/etc/tool/tool.conf",
            "/etc/tool/config.conf",
            "/x1/tool/tool.conf",
            "/x1/tool/config.conf",
            "/x2/tool/tool.conf",
            "/x2/tool/config.conf",
            "/r/home/.config/tool/tool.conf",
            "/r/home/.config/tool/config.conf",
            "/r/home/.tool/tool.conf",
            "/r/home/.tool/config.conf",
            "/r/bin/tool.conf",
            "/r/bin/config.conf",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(candidates, expected);
    }

    #[cfg(unix)]
    #[test]
    fn xdg_config_dirs_defaults_to_etc_xdg() {
        let env = environment(Path::new("/r"), "");
        let candidates = env.config_file_candidates(".toml", "settings");
        assert!(candidates.contains(&PathBuf::from("/etc/xdg/tool/tool.toml")));
        assert!(candidates.contains(&PathBuf::from("/etc/xdg/tool/settings.toml")));
    }

    #[test]
    fn existing_files_are_filtered_in_order() {
        let tmp = TempDir::new().expect("tmp");
        let env = environment(tmp.path(), "/nonexistent-xdg");

        let user_dir = tmp.path().join("home").join(".tool");
        fs::create_dir_all(&user_dir).expect("mkdir");
        fs::write(user_dir.join("config.conf"), "[s]\n").expect("write");
        fs::create_dir_all(tmp.path().join("bin")).expect("mkdir");
        fs::write(tmp.path().join("bin").join("tool.conf"), "[s]\n").expect("write");

        let found = env.existing_config_files(DEFAULT_CONFIG_EXT, DEFAULT_CONFIG_NAME);
        assert_eq!(found, vec![user_dir.join("config.conf"), tmp.path().join("bin").join("tool.conf")]);
    }
}
