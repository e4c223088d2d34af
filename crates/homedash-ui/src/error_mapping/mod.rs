//! Maps calendar and vehicle errors to homedash_core::AppError for consistent
//! user-facing messages. Each crate has its own module to keep mappings small.

use homedash_core::AppError;

mod calendar;
mod vehicle;

pub(crate) use vehicle::token_storage_error;

/// Conversion into the application-wide error type.
pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}
