//! Error types for chat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for chat operations
///
/// Persisted-state corruption and out-of-range settings never surface here;
/// those are recovered silently at the load and resolve boundaries. What is
/// left are the failures that end an invocation.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Provider-related errors (transport failures, unexpected status codes)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Authentication errors (e.g., 401 Unauthorized)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The provider refused the request because of a rate limit or quota
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The provider answered, but not with a usable completion
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// State file errors (directory creation, atomic persist)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A conversation invariant that the load boundary should guarantee was broken
    #[error("Internal consistency violation: {0}")]
    InvariantViolation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport failures reaching the provider (connect, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for chat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
