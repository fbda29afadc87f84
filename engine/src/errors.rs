//! Failure taxonomy for user actions.
//!
//! Every action either completes with content or ends in exactly one
//! [`ActionError`]. Transport failures are classified from
//! [`ClientError`] so callers never need to inspect HTTP details.

use thiserror::Error;

use ragna_client::ClientError;

use crate::Feature;

/// Input rejected before any request leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocalInputError {
    #[error("Please enter an API key")]
    MissingApiKey,
    #[error("API key is already validated; reset it first")]
    AlreadyValidated,
    #[error("Please enter a problem ID")]
    MissingProblemId,
    #[error("Please enter code to review")]
    MissingCode,
    #[error("Please select at least one topic")]
    NoTopics,
    #[error("Please enter a message")]
    EmptyMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] LocalInputError),
    #[error("API key has not been validated")]
    NotValidated,
    #[error("backend rejected the API key (HTTP {status})")]
    Auth { status: u16 },
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("backend returned HTTP {status}")]
    Http { status: u16 },
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Coarse grouping used for logging and presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    Network,
    Decode,
}

impl ActionError {
    /// Classify a transport failure for the feature that produced it.
    ///
    /// A non-2xx from key validation is always an auth failure. Elsewhere only
    /// 401 and 403 are.
    pub(crate) fn from_client(err: ClientError, feature: Feature) -> Self {
        match err {
            ClientError::Status { status, .. }
                if feature == Feature::Validate || status == 401 || status == 403 =>
            {
                ActionError::Auth { status }
            }
            ClientError::Status { status, .. } => ActionError::Http { status },
            ClientError::Timeout(_) => ActionError::Timeout,
            ClientError::Decode { endpoint, reason } => {
                ActionError::Decode(format!("{endpoint}: {reason}"))
            }
            ClientError::Network(e) | ClientError::Build(e) => ActionError::Network(e.to_string()),
            ClientError::InvalidBaseUrl { url, reason } => {
                ActionError::Network(format!("invalid backend URL {url}: {reason}"))
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::Validation(_) | ActionError::NotValidated => ErrorKind::Validation,
            ActionError::Auth { .. } => ErrorKind::Auth,
            ActionError::Network(_) | ActionError::Timeout | ActionError::Http { .. } => {
                ErrorKind::Network
            }
            ActionError::Decode(_) => ErrorKind::Decode,
        }
    }

    /// Text shown to the user when `feature` ends with this error.
    ///
    /// Local rejections carry their own message; remote failures use the
    /// feature's generic failure text.
    pub fn user_message(&self, feature: Feature) -> String {
        match self {
            ActionError::Validation(local) => local.to_string(),
            ActionError::NotValidated => "Please validate your API key first".to_string(),
            ActionError::Timeout => format!("{} (request timed out)", feature.failure_message()),
            _ => feature.failure_message().to_string(),
        }
    }
}
