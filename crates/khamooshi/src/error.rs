use std::fmt::Display;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::scraper::FetchError;

/// Every failure the outage interpreter reports. The `Display` text is the
/// user-facing message and [`OutageError::code`] the HTTP-style status.
#[derive(Debug, thiserror::Error)]
pub enum OutageError {
    #[error("Invalid date format")]
    InvalidDateFormat,
    #[error("Invalid day: {0}")]
    InvalidDay(String),
    #[error("Invalid month: {0}")]
    InvalidMonth(String),
    #[error("Invalid year: {0}")]
    InvalidYear(String),
    #[error("No places provided")]
    NoPlaces,
    #[error("Please provide a search phrase.")]
    MissingSearchPhrase,
    #[error("Could not retrieve outage date.")]
    OutageDateUnavailable,
    #[error("There was an error retrieving the outage table from {host}.")]
    Fetch {
        host: String,
        #[source]
        source: FetchError,
    },
}

impl OutageError {
    pub fn code(&self) -> u16 {
        match self {
            OutageError::InvalidDateFormat
            | OutageError::InvalidDay(_)
            | OutageError::InvalidMonth(_)
            | OutageError::InvalidYear(_)
            | OutageError::NoPlaces
            | OutageError::MissingSearchPhrase => 400,
            OutageError::OutageDateUnavailable => 422,
            OutageError::Fetch { .. } => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.code())
    }
}

/// The `{ error, code }` shape handed to transports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}

impl From<&OutageError> for ErrorBody {
    fn from(err: &OutageError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
        }
    }
}

impl Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{} ({})", self.error, self.code),
        }
    }
}
