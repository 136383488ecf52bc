use thiserror::Error;

/// Failure of a call to the scheduling / booking backend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    /// Backend rejected the request; the message is shown to the user as-is
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure of the durable draft storage port
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to write storage: {0}")]
    Write(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    #[error("Please complete all required fields: {0}")]
    Incomplete(&'static str),
    #[error("Missing selection: {0}")]
    MissingSelection(&'static str),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SubmissionError {
    /// Text shown to the user in the failure toast
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}
