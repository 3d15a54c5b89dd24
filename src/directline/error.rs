//! DirectLine error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Token generation or refresh rejected.
    #[error("Error getting DirectLine token: {message}")]
    Auth { status: u16, message: String },

    /// Conversation could not be opened.
    #[error("Error opening new conversation: {message}")]
    Conversation { status: u16, message: String },

    /// Non-success status on an activity call.
    #[error("Error {operation}: {message}")]
    Transport {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("Unexpected {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed {endpoint} response: {reason}")]
    Schema {
        endpoint: &'static str,
        reason: &'static str,
    },

    #[error("DirectLine secret not configured. Set DIRECT_LINE_SECRET or directline.secret in config.toml")]
    MissingSecret,

    #[error("No open conversation")]
    NoConversation,

    #[error(transparent)]
    Http(#[from] crate::http::Error),
}

impl Error {
    /// HTTP status reported by the service, if the failure came from one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. }
            | Self::Conversation { status, .. }
            | Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}
