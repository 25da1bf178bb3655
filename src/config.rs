//! Configuration file schema for sigscan.
//!
//! Every field is optional; a missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["sigscan.yaml", ".sigscan.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Paths analysed when none are given on the command line.
    #[serde(default)]
    pub paths: Vec<String>,
    /// Search method bodies for `func_get_args()` when deciding variadic-ness.
    #[serde(default = "default_true")]
    pub look_for_implicit_variadic: bool,
    /// Glob patterns for paths to skip during directory scans (e.g. "**/vendor/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            look_for_implicit_variadic: true,
            excluded_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        // An empty file deserializes to null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Find a config file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Compile `excluded_paths`. `None` when there are no patterns.
    pub fn excluded_set(&self) -> anyhow::Result<Option<GlobSet>> {
        if self.excluded_paths.is_empty() {
            return Ok(None);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern)
                .map_err(|e| anyhow::anyhow!("invalid excluded path {:?}: {}", pattern, e))?;
            builder.add(glob);
        }
        Ok(Some(builder.build()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::parse_str("").unwrap();
        assert!(config.paths.is_empty());
        assert!(config.look_for_implicit_variadic);
        assert!(config.excluded_set().unwrap().is_none());
    }

    #[test]
    fn test_parse_fields() {
        let config = Config::parse_str(
            r#"
paths:
  - src
  - lib
look_for_implicit_variadic: false
excluded_paths:
  - "**/vendor/**"
"#,
        )
        .unwrap();

        assert_eq!(config.paths, vec!["src", "lib"]);
        assert!(!config.look_for_implicit_variadic);
        let set = config.excluded_set().unwrap().unwrap();
        assert!(set.is_match("project/vendor/lib/a.php"));
        assert!(!set.is_match("project/src/a.php"));
    }

    #[test]
    fn test_invalid_glob() {
        let config = Config {
            excluded_paths: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(config.excluded_set().is_err());
    }

    #[test]
    fn test_discover() {
        let temp = TempDir::new().unwrap();
        assert!(Config::discover(temp.path()).is_none());

        std::fs::write(temp.path().join(".sigscan.yaml"), "paths: [src]\n").unwrap();
        let found = Config::discover(temp.path()).unwrap();
        assert!(found.ends_with(".sigscan.yaml"));
        assert_eq!(Config::parse_file(found).unwrap().paths, vec!["src"]);
    }
}
