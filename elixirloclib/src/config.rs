//! Project configuration.
//!
//! Settings are read from a TOML file. The file is resolved in this order:
//!
//! 1. an explicit path (the CLI `--config` flag)
//! 2. `elixirloc.toml` or `.elixirloc.toml` in the analysed directory
//! 3. nothing found: defaults
//!
//! ```toml
//! suffixes = [".ex", ".exs"]
//! include = ["**/lib/**"]
//! exclude = ["**/test/support/**"]
//! tests = ["test"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ElixirlocError;
use crate::filter::FilterConfig;
use crate::language::Elixir;
use crate::Result;

/// Project-level config file names, checked in order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["elixirloc.toml", ".elixirloc.toml"];

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// File suffixes treated as Elixir sources
    #[serde(default = "Elixir::default_suffixes")]
    pub suffixes: Vec<String>,

    /// Glob patterns to include (if empty, every source file)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Directories, relative to the project root, holding test sources
    #[serde(default = "Elixir::default_test_dirs")]
    pub tests: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            suffixes: Elixir::default_suffixes(),
            include: Vec::new(),
            exclude: Vec::new(),
            tests: Elixir::default_test_dirs(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ElixirlocError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse_named(&content, &path.display().to_string())
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self> {
        Self::parse_named(content, "<string>")
    }

    fn parse_named(content: &str, origin: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ElixirlocError::Config {
            origin: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Load the configuration for a project directory.
    pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        match resolve(project_dir, explicit).path() {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Build the file filter described by this configuration.
    pub fn filter(&self) -> Result<FilterConfig> {
        FilterConfig::new()
            .suffixes(&self.suffixes)
            .include_many(&self.include)?
            .exclude_many(&self.exclude)
    }
}

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config`.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// Resolves the configuration file path.
///
/// See module-level docs for resolution order. A file analysed directly
/// (rather than a directory) looks for config next to it.
pub fn resolve(project_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    let dir = if project_dir.is_file() {
        project_dir.parent().unwrap_or(project_dir)
    } else {
        project_dir
    };

    for name in PROJECT_CONFIG_NAMES {
        let candidate = dir.join(name);
        if candidate.exists() {
            tracing::debug!("Found project config: {}", candidate.display());
            return ConfigSource::Project(candidate);
        }
    }

    ConfigSource::Default
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
suffixes = [".ex"]
include = ["**/lib/**"]
exclude = ["**/generated/**"]
tests = ["test", "integration"]
"#,
        )
        .unwrap();

        assert_eq!(config.suffixes, vec![".ex"]);
        assert_eq!(config.include, vec!["**/lib/**"]);
        assert_eq!(config.exclude, vec!["**/generated/**"]);
        assert_eq!(config.tests, vec!["test", "integration"]);
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.suffixes, vec![".ex", ".exs"]);
        assert_eq!(config.tests, vec!["test"]);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = Config::parse("suffixes = [");

        assert!(matches!(result, Err(ElixirlocError::Config { .. })));
    }

    #[test]
    fn test_parse_unknown_key() {
        let result = Config::parse("colour = true");

        assert!(matches!(result, Err(ElixirlocError::Config { .. })));
    }

    #[test]
    fn test_filter_from_config() {
        let config = Config {
            suffixes: vec![".exs".to_string()],
            include: Vec::new(),
            exclude: vec!["**/priv/**".to_string()],
            ..Config::default()
        };

        let filter = config.filter().unwrap();

        assert!(filter.matches(Path::new("app/mix.exs")));
        assert!(!filter.matches(Path::new("app/lib/a.ex")));
        assert!(!filter.matches(Path::new("app/priv/seeds.exs")));
    }

    #[test]
    fn test_filter_from_config_invalid_glob() {
        let config = Config {
            include: vec!["[oops".to_string()],
            ..Config::default()
        };

        assert!(matches!(
            config.filter(),
            Err(ElixirlocError::InvalidGlob { .. })
        ));
    }

    #[test]
    fn test_resolve_explicit_wins() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("elixirloc.toml"), "").unwrap();
        let explicit = temp.path().join("custom.toml");

        let source = resolve(temp.path(), Some(&explicit));

        assert_eq!(source, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn test_resolve_project_config() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(".elixirloc.toml"), "").unwrap();

        let source = resolve(temp.path(), None);

        assert_eq!(
            source,
            ConfigSource::Project(temp.path().join(".elixirloc.toml"))
        );
    }

    #[test]
    fn test_resolve_default() {
        let temp = tempdir().unwrap();

        assert_eq!(resolve(temp.path(), None), ConfigSource::Default);
        assert_eq!(Config::load(temp.path(), None).unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_project_dir() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("elixirloc.toml"),
            "exclude = [\"**/test/**\"]\n",
        )
        .unwrap();

        let config = Config::load(temp.path(), None).unwrap();

        assert_eq!(config.exclude, vec!["**/test/**"]);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("missing.toml");

        let result = Config::load(temp.path(), Some(&missing));

        assert!(matches!(result, Err(ElixirlocError::FileRead { .. })));
    }
}
