//! Error types for cibauth
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for cibauth operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, authorization requests, polling, QR rendering,
/// and account provisioning.
#[derive(Error, Debug)]
pub enum CibauthError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Structured error reported by the authorization server
    #[error("Authorization server error: {code}: {description}")]
    Server {
        /// The `error` field of the server reply
        code: String,
        /// The `error_description` field of the server reply (may be empty)
        description: String,
    },

    /// Polling budget exhausted while the authorization stayed pending
    #[error("Authorization timed out while pending")]
    PollTimeout {
        /// The `error` field of the last reply seen before giving up
        code: Option<String>,
        /// The `error_description` field of that reply
        description: Option<String>,
    },

    /// QR encoding errors (payload too large, unsupported content)
    #[error("QR encoding error: {0}")]
    Qr(String),

    /// Session delivery errors (messages or identity could not be recorded)
    #[error("Session error: {0}")]
    Session(String),

    /// Account provisioning errors
    #[error("Provisioning error: {0}")]
    Provision(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for cibauth operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
