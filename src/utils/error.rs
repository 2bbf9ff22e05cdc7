//! Error types for the Imagify client.
//!
//! Provides a hierarchy of error types using `thiserror`. [`ClientError`] is the
//! transport taxonomy surfaced by a backend call; [`ImagifyError`] wraps it
//! together with input, configuration and IO failures.

use std::io;
use std::time::Duration;
use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a failed backend call, as shown to the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// No response was received
    Network,
    /// The backend answered with a non-success status or an error body
    Response,
    /// A response arrived but could not be decoded into the expected media
    MalformedPayload,
}

/// Failure of a single backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ClientError {
    /// Transport-level failure, no response received
    #[error("Network error: {0}")]
    Network(String),

    /// The call exceeded its hard timeout
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Non-success status, with the backend's `detail` when it sent one
    #[error("Backend responded with {status}: {detail}")]
    Response { status: u16, detail: String },

    /// Response received but not decodable as the expected media type
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

/// Convenience result type for backend calls.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn network<T: Into<String>>(msg: T) -> Self {
        Self::Network(msg.into())
    }

    pub fn response<T: Into<String>>(status: u16, detail: T) -> Self {
        Self::Response { status, detail: detail.into() }
    }

    pub fn malformed<T: Into<String>>(msg: T) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Projects the failure onto the presenter-facing taxonomy.
    ///
    /// A timeout means no response was received, so it counts as a network failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::Timeout(_) => ErrorKind::Network,
            Self::Response { .. } => ErrorKind::Response,
            Self::MalformedPayload(_) => ErrorKind::MalformedPayload,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedPayload(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Response { status: status.as_u16(), detail: err.to_string() }
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Problems with what the user handed us, caught before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InputError {
    /// An evaluation was requested with no source image
    #[error("Please select an image first")]
    NoImageSelected,
    /// The selected file is not an image
    #[error("Please select an image file (got {0})")]
    NotAnImage(String),
    /// The file extension is not one the backend accepts
    #[error("Invalid file type: {0}. Allowed: jpg, jpeg, png, webp, jfif")]
    UnsupportedExtension(String),
}

/// Main error type for the client application.
#[derive(Error, Debug, Serialize)]
pub enum ImagifyError {
    /// User input was rejected before reaching the backend
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// A backend call failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// An operation was invalidated before its call produced a result
    #[error("No result: {0}")]
    NoResult(String),
}

/// Convenience result type for client operations.
pub type ImagifyResult<T> = Result<T, ImagifyError>;

impl ImagifyError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn io<T: Into<String>>(msg: T) -> Self {
        Self::IO(msg.into())
    }

    pub fn no_result<T: Into<String>>(msg: T) -> Self {
        Self::NoResult(msg.into())
    }
}

impl From<io::Error> for ImagifyError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_counts_as_network_failure() {
        let err = ClientError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.to_string(), "Request timed out after 1500ms");
    }

    #[test]
    fn response_error_carries_backend_detail() {
        let err = ClientError::response(500, "REPLICATE_API_TOKEN not set");
        assert_eq!(err.kind(), ErrorKind::Response);
        assert!(err.to_string().contains("REPLICATE_API_TOKEN not set"));
    }

    #[test]
    fn input_error_converts_into_application_error() {
        let err: ImagifyError = InputError::NoImageSelected.into();
        assert!(matches!(err, ImagifyError::Input(InputError::NoImageSelected)));
    }
}
