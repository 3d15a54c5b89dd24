//! Orchestration client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Orchestration setting missing: {0}")]
    MissingSetting(&'static str),

    #[error("Analysis request failed: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected analysis response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error(transparent)]
    Http(#[from] crate::http::Error),
}
