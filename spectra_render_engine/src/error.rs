//! Error types for the Spectra render engine
//!
//! Errors surface only on the factory / two-phase-init path (`load()`,
//! `init()`, scene factories). The per-frame pipeline never returns errors:
//! it logs and degrades (missing target, unsupported capability) so a bad
//! frame never aborts the caller's loop.

use std::fmt;

/// Result type for Spectra engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Spectra engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (headless, Vulkan, etc.)
    BackendError(String),

    /// Invalid resource (render target, sensor configuration, etc.)
    InvalidResource(String),

    /// Initialization failed (scene factory, two-phase camera init)
    InitializationFailed(String),

    /// Capability not implemented by the active backend
    UnsupportedOperation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UnsupportedOperation(msg) => write!(f, "Unsupported operation: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
