use homedash_core::error::ReqwestErrorExt;
use homedash_core::{AppError, AuthError, DatabaseError, VehicleError as CoreVehicleError};
use homedash_vehicle::VehicleError;

use super::IntoAppError;

impl IntoAppError for VehicleError {
    fn into_app_error(self) -> AppError {
        match self {
            VehicleError::AuthRequired => AppError::Auth(AuthError::TokenNotFound("vehicle".into())),
            VehicleError::TokenExpired => AppError::Auth(AuthError::TokenExpired),
            VehicleError::NoVehicles => AppError::Vehicle(CoreVehicleError::NoVehicles),
            VehicleError::VehicleNotFound(s) | VehicleError::Unavailable(s) => {
                AppError::Vehicle(CoreVehicleError::Unavailable(s))
            }
            VehicleError::RateLimited(secs) => AppError::Vehicle(CoreVehicleError::RateLimited(secs)),
            VehicleError::ApiError(s) => AppError::Vehicle(CoreVehicleError::ApiError(s)),
            VehicleError::Storage(s) => AppError::Database(DatabaseError::QueryFailed(s)),
            VehicleError::NetworkError(e) => AppError::Network(e.into_network_error()),
        }
    }
}

/// Token file failures are credential storage errors.
pub fn token_storage_error(e: &anyhow::Error) -> AppError {
    AppError::Auth(AuthError::StorageError(format!("{:#}", e)))
}
