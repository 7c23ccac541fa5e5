//! Error types for metric output

use std::fmt;

use reqwest::StatusCode;

/// Result type alias for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Errors that can occur while shipping metrics to a sink
#[derive(Debug)]
pub enum OutputError {
    /// The outbound request could not be constructed
    Request(reqwest::Error),

    /// The exchange with the sink failed
    Transport(reqwest::Error),

    /// The sink answered with a non-success status
    BadStatus(StatusCode),

    /// I/O error (stdout writes, etc.)
    IoError(std::io::Error),
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputError::Request(err) => write!(f, "failed to build output request: {}", err),
            OutputError::Transport(err) => write!(f, "failed to reach output sink: {}", err),
            OutputError::BadStatus(code) => {
                write!(f, "output sink answered with status {}", code)
            }
            OutputError::IoError(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Request(err) | OutputError::Transport(err) => Some(err),
            OutputError::IoError(err) => Some(err),
            OutputError::BadStatus(_) => None,
        }
    }
}

impl From<std::io::Error> for OutputError {
    fn from(err: std::io::Error) -> Self {
        OutputError::IoError(err)
    }
}
