use reqwest::StatusCode;
use shared::domain::CorpusId;
use thiserror::Error;

use crate::phone::{PhoneEvent, VerificationState};

/// Any failed backend call. Transport, status and body problems are all
/// treated as "the operation failed"; the variants only carry diagnostics.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}")]
    Status { endpoint: String, status: StatusCode },
    #[error("{endpoint} returned an unexpected body: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl RequestError {
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => endpoint,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } | Self::Decode { source, .. } => source.status(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("result {0} is not part of the current search results")]
    UnknownResult(CorpusId),
    #[error("search failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum PhoneError {
    #[error("{event} is not accepted while verification is in state {state}")]
    Rejected {
        event: PhoneEvent,
        state: VerificationState,
    },
    #[error("an OTP cannot be sent for the current phone number")]
    SendBlocked,
    #[error("OTP codes are exactly six digits")]
    InvalidCode,
    #[error(transparent)]
    Request(#[from] RequestError),
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0}")]
    Refused(String),
    #[error(transparent)]
    Request(#[from] RequestError),
}
