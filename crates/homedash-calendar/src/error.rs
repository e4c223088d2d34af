//! Calendar-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    /// Rejected before any I/O; the message is shown to the user as-is.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Partial write: {inserted} of {total} events saved")]
    PartialWrite { inserted: usize, total: usize },
}

pub type CalendarResult<T> = Result<T, CalendarError>;

impl CalendarError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => msg.clone(),
            Self::StorageUnavailable(detail) => format!("DB error: {}", detail),
            Self::PartialWrite { inserted, total } => format!(
                "DB error: only {} of {} events were saved. Please refresh.",
                inserted, total
            ),
        }
    }

    /// Whether the caller may retry the same request once.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

impl From<rusqlite::Error> for CalendarError {
    fn from(e: rusqlite::Error) -> Self {
        Self::StorageUnavailable(e.to_string())
    }
}
