//! Shared primitives used across Nimbus crates.

use core::fmt;

/// Result alias used across the workspace.
pub type NimbusResult<T> = Result<T, NimbusError>;

/// Error carried through the load pipeline.
///
/// `code` is a stable dotted identifier (for example
/// `net.locator.port_invalid`) suitable for matching in tests and logs;
/// `message` holds the human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NimbusError {
    pub code: &'static str,
    pub message: String,
}

impl NimbusError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for NimbusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for NimbusError {}
