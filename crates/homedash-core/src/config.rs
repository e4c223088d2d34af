use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the vehicle API access token.
pub const VEHICLE_TOKEN_ENV: &str = "HOMEDASH_VEHICLE_TOKEN";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Event and mileage database
    pub database: DatabaseConfig,

    /// Shared calendar settings
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Vehicle telemetry settings
    #[serde(default)]
    pub vehicle: VehicleConfig,

    /// UI preferences
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file holding calendar events and the mileage log
    pub path: PathBuf,
}

/// Display color for one calendar author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorColor {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Authors offered when creating an event
    #[serde(default = "default_users")]
    pub users: Vec<String>,

    /// Badge color for authors without an entry
    #[serde(default = "default_author_color")]
    pub default_color: String,

    /// Badge colors per author (matched case-insensitively)
    #[serde(default = "default_author_colors")]
    pub authors: Vec<AuthorColor>,
}

fn default_users() -> Vec<String> {
    vec!["Amanda".to_string(), "Daniel".to_string()]
}

fn default_author_colors() -> Vec<AuthorColor> {
    vec![
        AuthorColor {
            name: "Amanda".to_string(),
            color: "#d63384".to_string(),
        },
        AuthorColor {
            name: "Daniel".to_string(),
            color: "#1e6ffb".to_string(),
        },
    ]
}

fn default_author_color() -> String {
    "#868e96".to_string()
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            users: default_users(),
            default_color: default_author_color(),
            authors: default_author_colors(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// Base URL of the vehicle owner API
    #[serde(default = "default_vehicle_api_url")]
    pub api_base_url: String,

    /// Account email (informational, shown on the vehicle page)
    #[serde(default)]
    pub email: String,

    /// API access token (optional, can be set via environment)
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,

    /// Seconds to wait after waking a sleeping vehicle
    #[serde(default = "default_wake_wait_seconds")]
    pub wake_wait_seconds: u64,

    /// Average miles per day above which a day is highlighted
    #[serde(default = "default_high_mileage_threshold")]
    pub high_mileage_threshold: f64,
}

fn default_vehicle_api_url() -> String {
    "https://owner-api.teslamotors.com".to_string()
}

fn default_wake_wait_seconds() -> u64 {
    30
}

fn default_high_mileage_threshold() -> f64 {
    40.0
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_vehicle_api_url(),
            email: String::new(),
            access_token: std::env::var(VEHICLE_TOKEN_ENV).ok(),
            wake_wait_seconds: default_wake_wait_seconds(),
            high_mileage_threshold: default_high_mileage_threshold(),
        }
    }
}

impl VehicleConfig {
    /// Check if an access token is available
    pub fn is_configured(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Dark mode enabled
    #[serde(default)]
    pub dark_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = default_config_dir();
        let database = DatabaseConfig {
            path: config_dir.join("homedash.db"),
        };

        Self {
            config_dir,
            database,
            calendar: CalendarConfig::default(),
            vehicle: VehicleConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("homedash")
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, creating default if it doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let mut config: Config = toml::from_str(&contents).map_err(|e| {
            ConfigError::ParseError(format!("{}: {}", config_path.display(), e))
        })?;

        // Secrets never live in the file
        if config.vehicle.access_token.is_none() {
            config.vehicle.access_token = std::env::var(VEHICLE_TOKEN_ENV).ok();
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // Database location
        if self.database.path.as_os_str().is_empty() {
            result.add_error("database.path", "Database path must not be empty");
        } else if self.database.path.is_dir() {
            result.add_error(
                "database.path",
                format!("Path is a directory: {}", self.database.path.display()),
            );
        }

        // Calendar authors
        if self.calendar.users.is_empty() {
            result.add_warning("calendar.users", "No calendar users configured");
        }
        for (i, author) in self.calendar.authors.iter().enumerate() {
            let field = format!("calendar.authors[{}]", i);
            if author.name.trim().is_empty() {
                result.add_error(&field, "Author name must not be empty");
            }
            if author.color.trim().is_empty() {
                result.add_error(&field, "Author color must not be empty");
            }
            let duplicate = self.calendar.authors[..i]
                .iter()
                .any(|a| a.name.eq_ignore_ascii_case(&author.name));
            if duplicate {
                result.add_warning(
                    &field,
                    format!("Duplicate author '{}', first entry wins", author.name),
                );
            }
        }
        if self.calendar.default_color.trim().is_empty() {
            result.add_error("calendar.default_color", "Default color must not be empty");
        }

        // Vehicle API
        self.validate_url(
            &self.vehicle.api_base_url,
            "vehicle.api_base_url",
            &mut result,
        );

        if !(self.vehicle.high_mileage_threshold > 0.0) {
            result.add_error(
                "vehicle.high_mileage_threshold",
                "Threshold must be greater than 0",
            );
        }

        if self.vehicle.wake_wait_seconds > 300 {
            result.add_warning(
                "vehicle.wake_wait_seconds",
                "Wake wait is more than 5 minutes",
            );
        }

        if !self.vehicle.is_configured() {
            result.add_warning(
                "vehicle",
                format!(
                    "Vehicle API token not configured (set {}) - vehicle page will be unavailable",
                    VEHICLE_TOKEN_ENV
                ),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> PathBuf {
        default_config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        // Default config should be valid (only warnings, no errors)
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_invalid_vehicle_url() {
        let mut config = Config::default();
        config.vehicle.api_base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "vehicle.api_base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.vehicle.api_base_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_mileage_threshold() {
        let mut config = Config::default();
        config.vehicle.high_mileage_threshold = 0.0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "vehicle.high_mileage_threshold"));
    }

    #[test]
    fn test_empty_author_color_is_error() {
        let mut config = Config::default();
        config.calendar.authors.push(AuthorColor {
            name: "Guest".to_string(),
            color: " ".to_string(),
        });
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "calendar.authors[2]"));
    }

    #[test]
    fn test_duplicate_author_is_warning() {
        let mut config = Config::default();
        config.calendar.authors.push(AuthorColor {
            name: "amanda".to_string(),
            color: "#000000".to_string(),
        });
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.message.contains("Duplicate")));
    }

    #[test]
    fn test_vehicle_not_configured_is_warning() {
        let mut config = Config::default();
        config.vehicle.access_token = None;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "vehicle"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.ui.dark_mode = true;
        config.vehicle.access_token = Some("secret".to_string());
        config.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("secret"), "token must not be written to disk");

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.ui.dark_mode);
        assert_eq!(loaded.calendar.authors.len(), 2);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.calendar.users, vec!["Amanda", "Daniel"]);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "config_dir = [unterminated").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        let config_err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(config_err, ConfigError::ParseError(msg) if msg.contains("config.toml")));
        assert_eq!(
            config_err.user_message(),
            "Configuration file is malformed. Check your settings."
        );
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
