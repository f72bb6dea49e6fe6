//! Error types for loading inputs and submitting test messages.

use std::path::PathBuf;
use thiserror::Error;

/// Message used when the raw editor holds valid JSON that is not an object.
pub const NOT_AN_OBJECT_MESSAGE: &str = "Raw payload must be a JSON object";

/// Message used when a failure carries nothing more specific.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Broad classification of a submission failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User input was rejected before any network call.
    Validation,
    /// The request failed in transport or the server rejected it.
    Request,
    /// Anything else.
    Unknown,
}

/// Errors during submission of a test message.
///
/// The `Display` output is exactly what the widget shows as its error text.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("Raw payload must be a JSON object")]
    NotAnObject,

    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    #[error("invalid JSON response: {source}")]
    InvalidResponse {
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot send to relative URL {url} without a base URL")]
    InvalidUrl { url: String },

    #[cfg(feature = "remote")]
    #[error("failed to send request to {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("a submission is already in flight")]
    InFlight,

    #[error("the {control} control is disabled by the widget options")]
    ControlDisabled { control: &'static str },

    #[error("Unknown error")]
    Unknown,
}

impl SubmitError {
    /// Builds the failure for a non-success status, preferring the server's
    /// own `message` string.
    pub fn request_failed(status: u16, body: &serde_json::Value) -> Self {
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        SubmitError::RequestFailed { status, message }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidJson { .. }
            | Self::NotAnObject
            | Self::InFlight
            | Self::ControlDisabled { .. } => ErrorKind::Validation,
            Self::RequestFailed { .. } | Self::InvalidResponse { .. } | Self::InvalidUrl { .. } => {
                ErrorKind::Request
            }
            #[cfg(feature = "remote")]
            Self::Network { .. } => ErrorKind::Request,
            Self::Unknown => ErrorKind::Unknown,
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::RequestFailed { .. } => 1,
            #[cfg(feature = "remote")]
            Self::Network { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors while loading operation documents and option files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid options: {source}")]
    InvalidOptions {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}
