//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Trends endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Unset means no timeout
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_endpoint() -> String {
    "/get_trends".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Base URL joined with the endpoint path
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }
}

/// Chart output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_output() -> PathBuf {
    PathBuf::from("reportChart.svg")
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    400
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Standard config file locations, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("trend-reports").join("config.toml")),
            Some(PathBuf::from("/etc/trend-reports/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load from default locations or environment
    pub fn load_default() -> LoadedConfig {
        Self::load_first(&Self::default_paths())
    }

    /// Load the first of `paths` that exists and parses
    ///
    /// Files that exist but fail to load are skipped and reported in
    /// [`LoadedConfig::errors`]; logging may not be set up yet, so the caller
    /// reports them.
    pub fn load_first(paths: &[PathBuf]) -> LoadedConfig {
        let mut errors = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: Some(path.clone()),
                        errors,
                    }
                }
                Err(e) => errors.push(e),
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            source: None,
            errors,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Client overrides
        if let Some(url) = lookup("TREND_REPORTS_BASE_URL") {
            self.client.base_url = url;
        }
        if let Some(timeout) = lookup("TREND_REPORTS_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.client.request_timeout_secs = Some(secs);
            }
        }

        // Chart overrides
        if let Some(output) = lookup("TREND_REPORTS_OUTPUT") {
            self.chart.output = PathBuf::from(output);
        }

        // Logging overrides
        if let Some(level) = lookup("TREND_REPORTS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("TREND_REPORTS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Result of searching the standard config locations
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config came from; `None` means defaults plus environment
    pub source: Option<PathBuf>,
    /// Files that were found but could not be loaded
    pub errors: Vec<ConfigError>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Trend Reports Configuration
#
# Environment variables override these settings:
# - TREND_REPORTS_BASE_URL
# - TREND_REPORTS_TIMEOUT_SECS
# - TREND_REPORTS_OUTPUT
# - TREND_REPORTS_LOG_LEVEL
# - TREND_REPORTS_LOG_FORMAT

[client]
# Server hosting the trends endpoint
base_url = "http://localhost:5000"

# Path of the trends endpoint
endpoint = "/get_trends"

# Request timeout in seconds (unset = wait indefinitely)
# request_timeout_secs = 30

[chart]
# SVG file the chart is written to
output = "reportChart.svg"

# Chart size in pixels
width = 800
height = 400

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.client.endpoint_url(), "http://localhost:5000/get_trends");
        assert_eq!(config.client.request_timeout_secs, None);
        assert_eq!(config.chart.output, PathBuf::from("reportChart.svg"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.client.base_url, "http://localhost:5000");
        assert_eq!(config.client.endpoint, "/get_trends");
        assert_eq!(config.chart.width, 800);
        assert_eq!(config.chart.height, 400);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[client]\nbase_url = \"http://reports.internal:8000/\"\nrequest_timeout_secs = 10\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.client.endpoint_url(),
            "http://reports.internal:8000/get_trends"
        );
        assert_eq!(config.client.request_timeout_secs, Some(10));
        assert_eq!(config.chart.width, 800);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[client\nbase_url = 1").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_first_reports_broken_files() {
        let dir = tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[client\nbase_url = 1").unwrap();
        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[chart]\nwidth = 1024\n").unwrap();
        let missing = dir.path().join("missing.toml");

        let loaded = Config::load_first(&[missing.clone(), broken.clone(), good.clone()]);
        assert_eq!(loaded.source, Some(good));
        assert_eq!(loaded.config.chart.width, 1024);
        assert_eq!(loaded.errors.len(), 1);
        assert!(matches!(&loaded.errors[0], ConfigError::Parse { path, .. } if *path == broken));

        let loaded = Config::load_first(&[missing, broken]);
        assert_eq!(loaded.source, None);
        assert_eq!(loaded.errors.len(), 1);
        assert_eq!(loaded.config.chart.width, 800);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("TREND_REPORTS_BASE_URL", "http://10.0.0.5:5000"),
            ("TREND_REPORTS_TIMEOUT_SECS", "15"),
            ("TREND_REPORTS_OUTPUT", "/tmp/out.svg"),
            ("TREND_REPORTS_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.client.base_url, "http://10.0.0.5:5000");
        assert_eq!(config.client.request_timeout_secs, Some(15));
        assert_eq!(config.chart.output, PathBuf::from("/tmp/out.svg"));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_timeout_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| {
            (key == "TREND_REPORTS_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.client.request_timeout_secs, None);
    }
}
