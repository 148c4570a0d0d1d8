use crate::error::{ProximityError, Result};
use crate::models::ReferenceId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Runtime settings of a proximity query
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySettings {
    pub radius_meters: f64,
    pub max_concurrency: usize,
    pub layer_timeout: Duration,
    pub summary_max_items: usize,
    pub identifier_field: String,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            radius_meters: 100.0,
            max_concurrency: 4,
            layer_timeout: Duration::from_secs(10),
            summary_max_items: 10,
            identifier_field: "OBJECTID".to_string(),
        }
    }
}

/// Layered configuration for the proximity query
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub reference: ConfigValue<u32>,
    pub search_radius: ConfigValue<f64>,
    pub max_concurrency: ConfigValue<usize>,
    pub layer_timeout_secs: ConfigValue<u64>,
    pub summary_max_items: ConfigValue<usize>,
    pub identifier_field: ConfigValue<String>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let settings = QuerySettings::default();
        Self {
            reference: ConfigValue::new(
                ReferenceId::WEB_MERCATOR_AUXILIARY.wkid(),
                ConfigSource::Default,
            ),
            search_radius: ConfigValue::new(settings.radius_meters, ConfigSource::Default),
            max_concurrency: ConfigValue::new(settings.max_concurrency, ConfigSource::Default),
            layer_timeout_secs: ConfigValue::new(
                settings.layer_timeout.as_secs(),
                ConfigSource::Default,
            ),
            summary_max_items: ConfigValue::new(settings.summary_max_items, ConfigSource::Default),
            identifier_field: ConfigValue::new(settings.identifier_field, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ProximityError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| ProximityError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(reference) = file_config.reference {
            self.reference.update(reference, ConfigSource::File);
        }

        if let Some(radius) = file_config.search_radius {
            self.search_radius.update(validate_radius(radius)?, ConfigSource::File);
        }

        if let Some(concurrency) = file_config.max_concurrency {
            self.max_concurrency.update(validate_concurrency(concurrency)?, ConfigSource::File);
        }

        if let Some(timeout) = file_config.layer_timeout_secs {
            self.layer_timeout_secs.update(timeout, ConfigSource::File);
        }

        if let Some(max_items) = file_config.summary_max_items {
            self.summary_max_items.update(max_items, ConfigSource::File);
        }

        if let Some(field) = file_config.identifier_field {
            self.identifier_field.update(field, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // PROXIMITY_REFERENCE
        if let Ok(reference_str) = env::var("PROXIMITY_REFERENCE") {
            match reference_str.parse::<u32>() {
                Ok(reference) => self.reference.update(reference, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PROXIMITY_REFERENCE value '{}': expected integer WKID",
                    reference_str
                ),
            }
        }

        // PROXIMITY_SEARCH_RADIUS
        if let Ok(radius_str) = env::var("PROXIMITY_SEARCH_RADIUS") {
            match parse_radius(&radius_str) {
                Ok(radius) => self.search_radius.update(radius, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PROXIMITY_SEARCH_RADIUS value '{}': expected positive meters",
                    radius_str
                ),
            }
        }

        // PROXIMITY_MAX_CONCURRENCY
        if let Ok(concurrency_str) = env::var("PROXIMITY_MAX_CONCURRENCY") {
            match parse_concurrency(&concurrency_str) {
                Ok(concurrency) => {
                    self.max_concurrency.update(concurrency, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid PROXIMITY_MAX_CONCURRENCY value '{}': expected integer >= 1",
                    concurrency_str
                ),
            }
        }

        // PROXIMITY_LAYER_TIMEOUT_SECS
        if let Ok(timeout_str) = env::var("PROXIMITY_LAYER_TIMEOUT_SECS") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => self.layer_timeout_secs.update(timeout, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PROXIMITY_LAYER_TIMEOUT_SECS value '{}': expected seconds",
                    timeout_str
                ),
            }
        }

        // PROXIMITY_SUMMARY_MAX_ITEMS
        if let Ok(max_items_str) = env::var("PROXIMITY_SUMMARY_MAX_ITEMS") {
            match max_items_str.parse::<usize>() {
                Ok(max_items) => {
                    self.summary_max_items.update(max_items, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid PROXIMITY_SUMMARY_MAX_ITEMS value '{}': expected integer",
                    max_items_str
                ),
            }
        }

        // PROXIMITY_IDENTIFIER_FIELD
        if let Ok(field) = env::var("PROXIMITY_IDENTIFIER_FIELD") {
            self.identifier_field.update(field, ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(reference) = overrides.reference {
            self.reference.update(reference, ConfigSource::Cli);
        }

        if let Some(radius) = overrides.search_radius {
            self.search_radius.update(radius, ConfigSource::Cli);
        }

        if let Some(concurrency) = overrides.max_concurrency {
            self.max_concurrency.update(concurrency, ConfigSource::Cli);
        }

        if let Some(timeout) = overrides.layer_timeout_secs {
            self.layer_timeout_secs.update(timeout, ConfigSource::Cli);
        }

        if let Some(max_items) = overrides.summary_max_items {
            self.summary_max_items.update(max_items, ConfigSource::Cli);
        }
    }

    /// The map reference system clicks are expressed in
    pub fn reference_id(&self) -> ReferenceId {
        ReferenceId(self.reference.value)
    }

    /// Settings consumed by the query pipeline
    pub fn to_query_settings(&self) -> QuerySettings {
        QuerySettings {
            radius_meters: self.search_radius.value,
            max_concurrency: self.max_concurrency.value.max(1),
            layer_timeout: Duration::from_secs(self.layer_timeout_secs.value),
            summary_max_items: self.summary_max_items.value,
            identifier_field: self.identifier_field.value.clone(),
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "reference".to_string(),
            (format!("WKID:{}", self.reference.value), self.reference.source),
        );

        map.insert(
            "search_radius".to_string(),
            (format!("{} m", self.search_radius.value), self.search_radius.source),
        );

        map.insert(
            "max_concurrency".to_string(),
            (self.max_concurrency.value.to_string(), self.max_concurrency.source),
        );

        map.insert(
            "layer_timeout_secs".to_string(),
            (format!("{}s", self.layer_timeout_secs.value), self.layer_timeout_secs.source),
        );

        map.insert(
            "summary_max_items".to_string(),
            (self.summary_max_items.value.to_string(), self.summary_max_items.source),
        );

        map.insert(
            "identifier_field".to_string(),
            (self.identifier_field.value.clone(), self.identifier_field.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    reference: Option<u32>,
    search_radius: Option<f64>,
    max_concurrency: Option<usize>,
    layer_timeout_secs: Option<u64>,
    summary_max_items: Option<usize>,
    identifier_field: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub reference: Option<u32>,
    pub search_radius: Option<f64>,
    pub max_concurrency: Option<usize>,
    pub layer_timeout_secs: Option<u64>,
    pub summary_max_items: Option<usize>,
}

/// Parse a search radius in meters, accepting an optional `m` suffix
pub fn parse_radius(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    let number = trimmed.strip_suffix('m').unwrap_or(trimmed).trim();
    number.parse::<f64>().map_err(|_| invalid_radius(s)).and_then(validate_radius)
}

/// Check that a radius is a positive, finite number of meters
pub fn validate_radius(radius: f64) -> Result<f64> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(invalid_radius(radius))
    }
}

fn invalid_radius(value: impl std::fmt::Display) -> ProximityError {
    ProximityError::ConfigInvalid {
        key: "search_radius".to_string(),
        reason: format!("Invalid search radius: {}. Use a positive number of meters", value),
    }
}

/// Parse the fan-out concurrency limit
pub fn parse_concurrency(s: &str) -> Result<usize> {
    s.trim().parse::<usize>().map_err(|_| invalid_concurrency(s)).and_then(validate_concurrency)
}

fn validate_concurrency(concurrency: usize) -> Result<usize> {
    if concurrency >= 1 {
        Ok(concurrency)
    } else {
        Err(invalid_concurrency(concurrency))
    }
}

fn invalid_concurrency(value: impl std::fmt::Display) -> ProximityError {
    ProximityError::ConfigInvalid {
        key: "max_concurrency".to_string(),
        reason: format!("Invalid concurrency: {}. Use an integer of at least 1", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.reference.value, 102100);
        assert_eq!(config.reference.source, ConfigSource::Default);
        assert_eq!(config.search_radius.value, 100.0);
        assert_eq!(config.identifier_field.value, "OBJECTID");
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
reference = 4326
search_radius = 250.0
max_concurrency = 2
layer_timeout_secs = 3
summary_max_items = 5
identifier_field = "FID"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.reference.value, 4326);
        assert_eq!(config.reference.source, ConfigSource::File);
        assert_eq!(config.search_radius.value, 250.0);
        assert_eq!(config.max_concurrency.value, 2);
        assert_eq!(config.identifier_field.value, "FID");

        let settings = config.to_query_settings();
        assert_eq!(settings.layer_timeout, Duration::from_secs(3));
        assert_eq!(settings.summary_max_items, 5);
    }

    #[test]
    fn test_file_rejects_non_positive_radius() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "search_radius = -5.0").unwrap();

        let result = LayeredConfig::with_defaults().load_from_file(file.path());
        assert!(matches!(result, Err(ProximityError::ConfigInvalid { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            reference: Some(32748),
            search_radius: Some(500.0),
            ..Default::default()
        };

        config.update_from_cli(overrides);

        assert_eq!(config.reference_id(), ReferenceId(32748));
        assert_eq!(config.reference.source, ConfigSource::Cli);
        assert_eq!(config.search_radius.value, 500.0);
        assert_eq!(config.max_concurrency.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_radius() {
        assert_eq!(parse_radius("100").unwrap(), 100.0);
        assert_eq!(parse_radius("250m").unwrap(), 250.0);
        assert!(parse_radius("0").is_err());
        assert!(parse_radius("-3").is_err());
        assert!(parse_radius("far").is_err());
    }

    #[test]
    fn test_parse_concurrency() {
        assert_eq!(parse_concurrency("1").unwrap(), 1);
        assert_eq!(parse_concurrency(" 8 ").unwrap(), 8);
        assert!(parse_concurrency("0").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert_eq!(map.len(), 6);
        let (reference, source) = &map["reference"];
        assert_eq!(reference, "WKID:102100");
        assert_eq!(*source, ConfigSource::Default);
    }
}
