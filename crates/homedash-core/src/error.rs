//! Centralized error types for the Homedash application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for UI display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// All errors in the Homedash application should be convertible to this type.
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Vehicle service error: {0}")]
    Vehicle(#[from] VehicleError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    ///
    /// These messages are designed to be actionable and non-technical.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Database(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Auth(e) => e.user_message(),
            AppError::Calendar(e) => e.user_message(),
            AppError::Vehicle(e) => e.user_message(),
        }
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
        }
    }
}

/// Database/storage errors (SQLite, local state).
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => {
                "Unable to reach the event database. Please try again."
            }
            DatabaseError::QueryFailed(_) => "A data operation failed. Please try again.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
        }
    }
}

/// Authentication errors (API tokens).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Token not found for service: {0}")]
    TokenNotFound(String),

    #[error("Secure storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::TokenExpired => "Your session has expired. Please sign in again.",
            AuthError::TokenNotFound(_) => "Not signed in. Please authenticate.",
            AuthError::StorageError(_) => "Failed to save credentials. Please try again.",
        }
    }
}

/// Calendar errors surfaced to the user.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Invalid event: {0}")]
    InvalidInput(String),

    #[error("Only {inserted} of {total} events were saved")]
    PartialWrite { inserted: usize, total: usize },
}

impl CalendarError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CalendarError::InvalidInput(_) => "Please check the event details and try again.",
            CalendarError::PartialWrite { .. } => {
                "Some events could not be saved. Please refresh and try again."
            }
        }
    }
}

/// Vehicle service errors.
#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("No vehicles on this account")]
    NoVehicles,

    #[error("Vehicle unavailable: {0}")]
    Unavailable(String),

    #[error("Vehicle API error: {0}")]
    ApiError(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl VehicleError {
    pub fn user_message(&self) -> &'static str {
        match self {
            VehicleError::NoVehicles => "No vehicles found on this account.",
            VehicleError::Unavailable(_) => {
                "The vehicle is not responding. Please try again later."
            }
            VehicleError::ApiError(_) => "Vehicle service error. Please try again.",
            VehicleError::RateLimited(_) => "Too many requests. Please wait and try again.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let messages = [
            NetworkError::Timeout.user_message(),
            DatabaseError::QueryFailed("test".into()).user_message(),
            ConfigError::Invalid("test".into()).user_message(),
            AuthError::TokenExpired.user_message(),
            CalendarError::InvalidInput("test".into()).user_message(),
            VehicleError::NoVehicles.user_message(),
        ];

        for msg in messages {
            assert!(!msg.is_empty());
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let cal_err = CalendarError::PartialWrite {
            inserted: 2,
            total: 5,
        };
        let app_err: AppError = cal_err.into();
        assert!(matches!(
            app_err,
            AppError::Calendar(CalendarError::PartialWrite { inserted: 2, total: 5 })
        ));
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Auth(AuthError::TokenExpired);
        assert_eq!(
            app_err.user_message(),
            "Your session has expired. Please sign in again."
        );
    }

    #[test]
    fn test_server_error_message_depends_on_status() {
        let e = NetworkError::ServerError {
            status: 503,
            message: "down".into(),
        };
        assert!(e.user_message().contains("later"));

        let e = NetworkError::ServerError {
            status: 400,
            message: "bad".into(),
        };
        assert_eq!(e.user_message(), "The request failed. Please try again.");
    }
}
