use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::{Config, ValidationResult};
use crate::error::ConfigError;

/// Main application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
    validation: ValidationResult,
}

impl App {
    /// Create a new application instance from the on-disk config
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::with_config(config))
    }

    /// Create an application instance around an already loaded config
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            validation: ValidationResult::default(),
        }
    }

    /// Validate config and prepare the data directory
    pub fn initialize(&mut self) -> Result<()> {
        tracing::info!("Initializing application");

        self.validation = self.config.validate();
        if !self.validation.is_valid() {
            return Err(ConfigError::Invalid(self.validation.error_summary()).into());
        }
        for warning in &self.validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        if let Some(parent) = self.config.database.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }

        tracing::info!("Application initialized successfully");
        Ok(())
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle to the config for long-lived models
    pub fn shared_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Warnings collected during `initialize`
    pub fn warnings(&self) -> &[crate::config::ConfigValidationError] {
        &self.validation.warnings
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_initialize_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.database.path = dir.path().join("data").join("homedash.db");
        config.vehicle.access_token = None;

        let mut app = App::with_config(config);
        app.initialize().unwrap();

        assert!(dir.path().join("data").is_dir());
        assert!(app.warnings().iter().any(|w| w.field == "vehicle"));
        app.shutdown().unwrap();
    }

    #[test]
    fn test_initialize_rejects_invalid_config() {
        let mut config = Config::default();
        config.vehicle.api_base_url = "nope".to_string();

        let mut app = App::with_config(config);
        let err = app.initialize().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Invalid(summary)) if summary.contains("vehicle.api_base_url")
        ));
    }
}
