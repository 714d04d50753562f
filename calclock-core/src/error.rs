//! Error types for calclock.

use thiserror::Error;

/// Errors that can occur while running the clock.
#[derive(Error, Debug)]
pub enum ClockError {
    /// No usable credential: missing token file, missing OAuth client, or a
    /// failed/denied grant. Fatal at startup, never retried automatically.
    #[error("Auth error: {0}")]
    Auth(String),

    /// Network or API failure while fetching events. The caller keeps
    /// displaying the previous event list and retries later.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Display surface failure (window or matrix initialization, font load).
    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for calclock operations.
pub type ClockResult<T> = Result<T, ClockError>;
