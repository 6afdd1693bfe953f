use std::time::Duration;

use thiserror::Error;

/// Classifies engine errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HstsErrorKind {
    /// A required argument (context or domain) was missing
    InvalidArgument,
    /// Stream read failure while loading
    Io,
    /// Artifact header or tag did not match
    Format,
    /// Recognized header carrying a version this engine cannot read
    UnsupportedVersion,
    /// Input exceeded the configured size ceiling
    TooLarge,
    /// Allocation failed while loading
    OutOfMemory,
    /// Async load did not finish before its deadline
    Timeout,
    /// Background load task panicked or was cancelled
    TaskFailed,
}

/// HSTS engine error types
#[derive(Error, Debug)]
pub enum HstsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Unsupported artifact version: {0}")]
    UnsupportedVersion(u32),

    #[error("Input exceeds size limit of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Out of memory: failed to reserve {0} bytes")]
    OutOfMemory(usize),

    #[error("Load timed out after {0:?}")]
    Timeout(Duration),

    #[error("Load task failed: {0}")]
    TaskFailed(String),
}

impl HstsError {
    /// Returns the matchable kind of this error.
    pub fn kind(&self) -> HstsErrorKind {
        match self {
            HstsError::InvalidArgument(_) => HstsErrorKind::InvalidArgument,
            HstsError::Io(_) => HstsErrorKind::Io,
            HstsError::Format(_) => HstsErrorKind::Format,
            HstsError::UnsupportedVersion(_) => HstsErrorKind::UnsupportedVersion,
            HstsError::TooLarge { .. } => HstsErrorKind::TooLarge,
            HstsError::OutOfMemory(_) => HstsErrorKind::OutOfMemory,
            HstsError::Timeout(_) => HstsErrorKind::Timeout,
            HstsError::TaskFailed(_) => HstsErrorKind::TaskFailed,
        }
    }
}

pub type Result<T> = std::result::Result<T, HstsError>;
