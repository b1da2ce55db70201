// Failure kinds of a backend call.
//
// `analyze_domain` absorbs all of these into the fallback path; the enum
// keeps them apart for logging and for the health and install reports.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    /// The request could not be sent or completed (refused, DNS, timeout).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    /// The backend answered 200 but flagged the analysis as failed.
    #[error("backend reported failure: {}", .0.as_deref().unwrap_or("no detail"))]
    Rejected(Option<String>),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("could not read attachment: {0}")]
    Attachment(#[from] std::io::Error),
}

impl BackendError {
    pub fn is_transport(&self) -> bool {
        matches!(self, BackendError::Transport(_) | BackendError::Attachment(_))
    }
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;
