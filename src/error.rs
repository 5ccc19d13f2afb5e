//! Error types for symeig3 batch operations
//!
//! The per-matrix kernel never fails: non-finite input propagates to
//! non-finite output. Errors only arise at batch boundaries where callers hand
//! in their own buffers.

use thiserror::Error;

use crate::Backend;

/// Result type for symeig3 operations
pub type Result<T> = std::result::Result<T, SymEigError>;

/// Errors that can occur at batch entry points
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymEigError {
    /// Backend not available in this build
    #[error("Backend not available in this build: {0:?}")]
    UnsupportedBackend(Backend),

    /// Size mismatch between caller-provided buffers
    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_backend_error() {
        let err = SymEigError::UnsupportedBackend(Backend::Parallel);
        assert_eq!(
            err.to_string(),
            "Backend not available in this build: Parallel"
        );
    }

    #[test]
    fn test_size_mismatch_error() {
        let err = SymEigError::SizeMismatch {
            expected: 900,
            actual: 899,
        };
        assert_eq!(err.to_string(), "Size mismatch: expected 900, got 899");
    }

    #[test]
    fn test_invalid_input_error() {
        let err = SymEigError::InvalidInput("packed length 10 is not a multiple of 9".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid input: packed length 10 is not a multiple of 9"
        );
    }

    #[test]
    fn test_error_equality() {
        let err1 = SymEigError::SizeMismatch {
            expected: 3,
            actual: 2,
        };
        let err2 = SymEigError::SizeMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err1, err2);
    }
}
