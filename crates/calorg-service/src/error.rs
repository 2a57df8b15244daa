use std::path::PathBuf;

use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RfcError(#[from] calorg_rfc::error::RfcError),

    #[error("Failed to fetch calendar feed: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("I/O error on {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid recurrence rule in event {uid:?}: {source}")]
    RecurrenceError {
        uid: String,
        #[source]
        source: rrule::RRuleError,
    },

    #[error("Invalid event {uid:?}: {reason}")]
    InvalidEvent { uid: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ServiceError {
    pub(crate) fn invalid_event(uid: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEvent {
            uid: uid.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
