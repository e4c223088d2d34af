use homedash_calendar::CalendarError;
use homedash_core::{AppError, CalendarError as CoreCalendarError, DatabaseError};

use super::IntoAppError;

impl IntoAppError for CalendarError {
    fn into_app_error(self) -> AppError {
        match self {
            CalendarError::InvalidInput(msg) => {
                AppError::Calendar(CoreCalendarError::InvalidInput(msg))
            }
            CalendarError::StorageUnavailable(detail) => {
                AppError::Database(DatabaseError::ConnectionFailed(detail))
            }
            CalendarError::PartialWrite { inserted, total } => {
                AppError::Calendar(CoreCalendarError::PartialWrite { inserted, total })
            }
        }
    }
}
