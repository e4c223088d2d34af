//! Vehicle-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VehicleError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Token expired")]
    TokenExpired,

    #[error("No vehicles on this account")]
    NoVehicles,

    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),

    #[error("Vehicle unavailable: {0}")]
    Unavailable(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Mileage log error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

pub type VehicleResult<T> = Result<T, VehicleError>;

impl VehicleError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthRequired => "Vehicle account not connected. Add an access token.".to_string(),
            Self::TokenExpired => "Your vehicle session has expired. Please sign in again.".to_string(),
            Self::NoVehicles => "No vehicles found on this account.".to_string(),
            Self::VehicleNotFound(_) => "Vehicle not found".to_string(),
            Self::Unavailable(_) => "The vehicle is not responding. Try again later.".to_string(),
            Self::RateLimited(secs) => format!("Too many requests. Please wait {} seconds.", secs),
            Self::ApiError(msg) => format!("Vehicle service error: {}", msg),
            Self::Storage(_) => "Mileage history is unavailable".to_string(),
            Self::NetworkError(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Whether this error should trigger a token refresh.
    pub fn should_refresh_token(&self) -> bool {
        matches!(self, Self::TokenExpired | Self::AuthRequired)
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::Unavailable(_) | Self::NetworkError(_)
        )
    }
}

impl From<rusqlite::Error> for VehicleError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
