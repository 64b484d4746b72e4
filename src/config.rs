//! TOML-based service configuration.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::data::features::{DERIVED_GENERATION_COLUMNS, GENERATION_PREFIX};
use crate::plot::ChartSize;

/// Top-level configuration parsed from TOML.
///
/// All sections have defaults matching the container deployment: bind
/// `0.0.0.0:8000`, dataset at `data/energy_clean.csv`. Load from TOML with
/// [`AppConfig::from_toml_file`] or use [`AppConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Dataset location and column conventions.
    #[serde(default)]
    pub data: DataConfig,
    /// Cross-origin access.
    #[serde(default)]
    pub cors: CorsConfig,
    /// Chart rendering defaults.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8000`.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Dataset location and column conventions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// CSV file with the timestamp index in the first column.
    pub path: PathBuf,
    /// Prefix identifying per-source generation columns.
    pub generation_prefix: String,
    /// Prefixed columns that are derived rather than a source.
    pub excluded_generation: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/energy_clean.csv"),
            generation_prefix: GENERATION_PREFIX.to_string(),
            excluded_generation: DERIVED_GENERATION_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Cross-origin access.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Exact origins, or `scheme://host:*` to allow any port.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "https://saricmilos.com".to_string(),
                "http://localhost:*".to_string(),
            ],
        }
    }
}

/// Chart rendering defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartConfig {
    /// Chart width in pixels.
    pub width: u32,
    /// Chart height in pixels.
    pub height: u32,
    /// Days plotted when a POST omits `days`: `/plot` and `/composition_plot`.
    pub default_days: i64,
    /// Days pre-filled in the composition form.
    pub composition_default_days: i64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1100,
            height: 550,
            default_days: 3,
            composition_default_days: 10,
        }
    }
}

impl ChartConfig {
    /// Pixel size for renderers.
    pub fn size(&self) -> ChartSize {
        ChartSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"server.bind"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Smallest accepted chart dimension in pixels.
const MIN_CHART_PX: u32 = 200;

impl AppConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `server.bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind.parse().map_err(|e| {
            ConfigError::new("server.bind", format!("\"{}\" is not a socket address: {e}", self.server.bind))
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = self.bind_addr() {
            errors.push(e);
        }

        let d = &self.data;
        if d.path.as_os_str().is_empty() {
            errors.push(ConfigError::new("data.path", "must not be empty"));
        }
        if d.generation_prefix.is_empty() {
            errors.push(ConfigError::new("data.generation_prefix", "must not be empty"));
        }

        if self.cors.allowed_origins.iter().any(|o| o.trim().is_empty()) {
            errors.push(ConfigError::new("cors.allowed_origins", "entries must not be empty"));
        }

        let c = &self.chart;
        if c.width < MIN_CHART_PX {
            errors.push(ConfigError::new("chart.width", format!("must be >= {MIN_CHART_PX}")));
        }
        if c.height < MIN_CHART_PX {
            errors.push(ConfigError::new("chart.height", format!("must be >= {MIN_CHART_PX}")));
        }
        if c.default_days < 1 {
            errors.push(ConfigError::new("chart.default_days", "must be >= 1"));
        }
        if c.composition_default_days < 1 {
            errors.push(ConfigError::new("chart.composition_default_days", "must be >= 1"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_valid() {
        let cfg = AppConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
        assert_eq!(cfg.bind_addr().ok().map(|a| a.port()), Some(8000));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[server]
bind = "127.0.0.1:9000"

[data]
path = "fixtures/energy.csv"
generation_prefix = "gen_"
excluded_generation = ["gen_total"]

[cors]
allowed_origins = ["https://example.org"]

[chart]
width = 800
height = 400
default_days = 7
composition_default_days = 14
"#;
        let cfg = AppConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.server.bind.as_str()), Some("127.0.0.1:9000"));
        assert_eq!(cfg.as_ref().map(|c| c.data.generation_prefix.as_str()), Some("gen_"));
        assert_eq!(cfg.as_ref().map(|c| c.chart.size()), Some(ChartSize { width: 800, height: 400 }));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[server]
bind = "0.0.0.0:8000"
workers = 4
"#;
        assert!(AppConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[chart]
default_days = 5
"#;
        let cfg = AppConfig::from_toml_str(toml).ok();
        // overridden
        assert_eq!(cfg.as_ref().map(|c| c.chart.default_days), Some(5));
        // kept default
        assert_eq!(cfg.as_ref().map(|c| c.chart.width), Some(1100));
        assert_eq!(cfg.as_ref().map(|c| c.cors.allowed_origins.len()), Some(2));
        assert_eq!(
            cfg.as_ref().map(|c| c.data.excluded_generation.clone()),
            Some(vec!["generation_load_difference".to_string(), "total_generation".to_string()])
        );
    }

    #[test]
    fn validation_catches_bad_bind() {
        let mut cfg = AppConfig::default();
        cfg.server.bind = "not-an-address".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "server.bind"));
    }

    #[test]
    fn validation_catches_tiny_chart_and_zero_days() {
        let mut cfg = AppConfig::default();
        cfg.chart.width = 50;
        cfg.chart.composition_default_days = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "chart.width"));
        assert!(errors.iter().any(|e| e.field == "chart.composition_default_days"));
        assert!(!errors.iter().any(|e| e.field == "chart.height"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::from_toml_file(Path::new("/nonexistent/plotter.toml")).unwrap_err();
        assert_eq!(err.field, "config");
        assert!(err.message.contains("/nonexistent/plotter.toml"));
    }
}
