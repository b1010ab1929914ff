//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sampling::iso::DEFAULT_WINDOW_MINUTES;
use crate::sampling::{InspectionLevel, ZeroAqlSubstitute};

/// Name of the per-project config file, looked up from the current directory upward
pub const PROJECT_CONFIG_FILE: &str = ".backcheck.yaml";

/// Errors reading a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Backcheck configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Decimal AQL used in place of 0% by the pattern calculator
    pub zero_aql_substitute: Option<f64>,

    /// Production window (minutes) inspected by interval plans
    pub window_minutes: Option<f64>,

    /// Default units packed per container
    pub units_per_container: Option<u64>,

    /// Default production rate (per hour)
    pub production_rate: Option<f64>,

    /// Default inspection level for interval plans
    pub inspection_level: Option<InspectionLevel>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let mut config = Self::load_files(Self::global_config_path().as_deref(), &cwd);
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Merge the global file and the nearest project file (project wins)
    pub fn load_files(global: Option<&Path>, start_dir: &Path) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/backcheck/config.yaml)
        if let Some(path) = global.filter(|p| p.exists()) {
            config.merge_file(path);
        }

        // 3. Project config (.backcheck.yaml in this or a parent directory)
        if let Some(path) = Self::find_project_config(start_dir) {
            config.merge_file(&path);
        }

        config
    }

    /// Parse a single config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn merge_file(&mut self, path: &Path) {
        match Self::from_file(path) {
            Ok(other) => {
                tracing::debug!(path = %path.display(), "loaded config");
                self.merge(other);
            }
            Err(e) => tracing::warn!("skipping config: {}", e),
        }
    }

    /// 4. Environment variables
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(value) = var("BACKCHECK_ZERO_AQL_SUBSTITUTE") {
            match value.parse() {
                Ok(v) => self.zero_aql_substitute = Some(v),
                Err(_) => tracing::warn!(%value, "ignoring BACKCHECK_ZERO_AQL_SUBSTITUTE"),
            }
        }
        if let Some(value) = var("BACKCHECK_WINDOW_MINUTES") {
            match value.parse() {
                Ok(v) => self.window_minutes = Some(v),
                Err(_) => tracing::warn!(%value, "ignoring BACKCHECK_WINDOW_MINUTES"),
            }
        }
        if let Some(value) = var("BACKCHECK_FORMAT") {
            self.default_format = Some(value);
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "backcheck")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Walk up from `start` looking for a project config file
    fn find_project_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_CONFIG_FILE))
            .find(|path| path.is_file())
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.zero_aql_substitute.is_some() {
            self.zero_aql_substitute = other.zero_aql_substitute;
        }
        if other.window_minutes.is_some() {
            self.window_minutes = other.window_minutes;
        }
        if other.units_per_container.is_some() {
            self.units_per_container = other.units_per_container;
        }
        if other.production_rate.is_some() {
            self.production_rate = other.production_rate;
        }
        if other.inspection_level.is_some() {
            self.inspection_level = other.inspection_level;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    pub fn zero_aql_substitute(&self) -> ZeroAqlSubstitute {
        self.zero_aql_substitute
            .map(ZeroAqlSubstitute)
            .unwrap_or_default()
    }

    pub fn window_minutes(&self) -> f64 {
        self.window_minutes.unwrap_or(DEFAULT_WINDOW_MINUTES)
    }

    pub fn inspection_level(&self) -> InspectionLevel {
        self.inspection_level.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.zero_aql_substitute(), ZeroAqlSubstitute(0.001));
        assert_eq!(config.window_minutes(), 120.0);
        assert_eq!(config.inspection_level(), InspectionLevel::Normal);
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.yaml");
        fs::write(&global, "window_minutes: 90\nunits_per_container: 12\n").unwrap();

        let project = tmp.path().join("line-3");
        fs::create_dir_all(project.join("shift-a")).unwrap();
        fs::write(
            project.join(PROJECT_CONFIG_FILE),
            "window_minutes: 60\ninspection_level: tightened\n",
        )
        .unwrap();

        let config = Config::load_files(Some(&global), &project.join("shift-a"));
        assert_eq!(config.window_minutes(), 60.0);
        assert_eq!(config.units_per_container, Some(12));
        assert_eq!(config.inspection_level(), InspectionLevel::Tightened);
    }

    #[test]
    fn test_invalid_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(PROJECT_CONFIG_FILE),
            "window_minutes: [not a number\n",
        )
        .unwrap();

        let config = Config::load_files(None, tmp.path());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_file_reports_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.yaml");
        fs::write(&path, "inspection_level: sideways\n").unwrap();

        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config {
            window_minutes: Some(90.0),
            ..Config::default()
        };
        config.apply_env(|key| match key {
            "BACKCHECK_ZERO_AQL_SUBSTITUTE" => Some("0.005".to_string()),
            "BACKCHECK_WINDOW_MINUTES" => Some("soon".to_string()),
            "BACKCHECK_FORMAT" => Some("json".to_string()),
            _ => None,
        });

        assert_eq!(config.zero_aql_substitute(), ZeroAqlSubstitute(0.005));
        // Unparseable values leave the previous layer in place
        assert_eq!(config.window_minutes(), 90.0);
        assert_eq!(config.default_format.as_deref(), Some("json"));
    }
}
