//! Configuration management for sidenav.
//!
//! Parses `sidenav.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `cloud.url` supports `${VAR}` (error if unset) and `${VAR:-default}`.

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the mobile/desktop breakpoint.
    pub breakpoint: Option<u32>,
    /// Override whether categories can be collapsed.
    pub collapsible: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "sidenav.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Viewport classification.
    pub viewport: ViewportConfig,
    /// Sidebar behavior.
    pub sidebar: SidebarConfig,
    /// Cloud call-to-action link.
    pub cloud: CloudConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Viewport configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Widths above this many pixels count as desktop.
    pub breakpoint: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { breakpoint: 996 }
    }
}

/// Sidebar configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    /// Whether categories can be collapsed.
    pub collapsible: bool,
    /// Delay between a category click and the visual toggle.
    pub toggle_delay_ms: u64,
    /// Row height in pixels for estimated content heights.
    pub row_height: f64,
}

impl SidebarConfig {
    /// Toggle debounce delay.
    #[must_use]
    pub fn toggle_delay(&self) -> Duration {
        Duration::from_millis(self.toggle_delay_ms)
    }
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            collapsible: true,
            toggle_delay_ms: 100,
            row_height: 36.0,
        }
    }
}

/// Cloud link configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Base URL of the cloud console.
    pub url: String,
    /// Number of identity lookup attempts.
    pub max_attempts: u32,
    /// Delay between identity lookup attempts.
    pub interval_ms: u64,
}

impl CloudConfig {
    /// Identity lookup interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            url: "https://cloud.questdb.com/".to_owned(),
            max_attempts: 3,
            interval_ms: 200,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`cloud.url`").
        field: String,
        /// Error message (e.g., "${`CLOUD_URL`} not set").
        message: String,
    },
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `sidenav.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if parsing
    /// or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(breakpoint) = settings.breakpoint {
            self.viewport.breakpoint = breakpoint;
        }
        if let Some(collapsible) = settings.collapsible {
            self.sidebar.collapsible = collapsible;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::discover_from(&cwd)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.exists())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.cloud.url = expand::expand_env(&config.cloud.url, "cloud.url")?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport.breakpoint == 0 {
            return Err(ConfigError::Validation(
                "viewport.breakpoint must be greater than 0".to_owned(),
            ));
        }
        if !(self.sidebar.row_height.is_finite() && self.sidebar.row_height > 0.0) {
            return Err(ConfigError::Validation(
                "sidebar.row_height must be a positive number".to_owned(),
            ));
        }
        require_http_url(&self.cloud.url, "cloud.url")?;
        if self.cloud.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "cloud.max_attempts must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.viewport.breakpoint, 996);
        assert!(config.sidebar.collapsible);
        assert_eq!(config.sidebar.toggle_delay(), Duration::from_millis(100));
        assert_eq!(config.cloud.url, "https://cloud.questdb.com/");
        assert_eq!(config.cloud.max_attempts, 3);
        assert_eq!(config.cloud.interval(), Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.viewport.breakpoint, 996);
        assert_eq!(config.sidebar.toggle_delay_ms, 100);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[viewport]
breakpoint = 768

[sidebar]
collapsible = false
toggle_delay_ms = 50
row_height = 28.5

[cloud]
url = "https://cloud.example.com/"
max_attempts = 5
interval_ms = 500
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.viewport.breakpoint, 768);
        assert!(!config.sidebar.collapsible);
        assert_eq!(config.sidebar.toggle_delay_ms, 50);
        assert_eq!(config.sidebar.row_height, 28.5);
        assert_eq!(config.cloud.url, "https://cloud.example.com/");
        assert_eq!(config.cloud.max_attempts, 5);
        assert_eq!(config.cloud.interval_ms, 500);
    }

    #[test]
    fn test_validate_rejects_zero_breakpoint() {
        let mut config = Config::default();
        config.viewport.breakpoint = 0;

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("viewport.breakpoint"));
    }

    #[test]
    fn test_validate_rejects_bad_row_height() {
        let mut config = Config::default();
        config.sidebar.row_height = -1.0;

        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_non_http_cloud_url() {
        let mut config = Config::default();
        config.cloud.url = "ftp://cloud.example.com".to_owned();

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("cloud.url"));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.cloud.max_attempts = 0;

        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        let overrides = CliSettings {
            breakpoint: Some(1200),
            collapsible: Some(false),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.viewport.breakpoint, 1200);
        assert!(!config.sidebar.collapsible);
    }

    #[test]
    fn test_apply_cli_settings_none_keeps_values() {
        let mut config = Config::default();

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.viewport.breakpoint, 996);
        assert!(config.sidebar.collapsible);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[viewport]\nbreakpoint = 640\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.viewport.breakpoint, 640);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let result = Config::load(Some(&path), None);

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sidenav.toml");
        std::fs::write(&path, "[viewport\n").unwrap();

        let result = Config::load(Some(&path), None);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_cli_settings_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sidenav.toml");
        std::fs::write(&path, "").unwrap();
        let overrides = CliSettings {
            breakpoint: Some(0),
            ..Default::default()
        };

        let result = Config::load(Some(&path), Some(&overrides));

        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_discover_from_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("website/docs");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();

        let found = Config::discover_from(&nested);

        assert_eq!(found, Some(dir.path().join(CONFIG_FILENAME)));
    }
}
