//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wp_core::PhaseConfig;
use wp_core::phase::DEFAULT_GAP_THRESHOLD_MINUTES;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Record files or directories read when `--data` is not given.
    pub data_paths: Vec<PathBuf>,

    /// Longest silence in minutes that still counts as one work phase.
    pub gap_threshold_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_paths: dirs_data_path()
                .map(|dir| vec![dir.join("records")])
                .unwrap_or_default(),
            gap_threshold_minutes: DEFAULT_GAP_THRESHOLD_MINUTES,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WP_*)
        figment = figment.merge(Env::prefixed("WP_"));

        figment.extract()
    }

    /// Segmentation settings, with an optional command-line override.
    pub fn phase_config(&self, threshold_override: Option<i64>) -> PhaseConfig {
        PhaseConfig::new(threshold_override.unwrap_or(self.gap_threshold_minutes))
    }
}

/// Returns the platform-specific config directory for wp.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wp"))
}

/// Returns the platform-specific data directory for wp.
///
/// On Linux: `~/.local/share/wp`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("wp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_dirs_data_path_ends_with_wp() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "wp");
    }

    #[test]
    fn test_default_config_reads_records_dir() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.data_paths, vec![data_dir.join("records")]);
        assert_eq!(config.gap_threshold_minutes, 240);
    }

    #[test]
    fn test_debug_lists_every_field() {
        let config = Config {
            data_paths: vec![PathBuf::from("/tmp/records")],
            gap_threshold_minutes: 90,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("data_paths: [\"/tmp/records\"]"));
        assert!(debug.contains("gap_threshold_minutes: 90"));
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "data_paths = [\"/srv/records\"]\ngap_threshold_minutes = 120"
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.data_paths, vec![PathBuf::from("/srv/records")]);
        assert_eq!(config.gap_threshold_minutes, 120);
    }

    #[test]
    fn test_phase_config_prefers_override() {
        let config = Config {
            data_paths: vec![],
            gap_threshold_minutes: 240,
        };
        assert_eq!(config.phase_config(None).gap_threshold_minutes, 240);
        assert_eq!(config.phase_config(Some(90)).gap_threshold_minutes, 90);
    }
}
