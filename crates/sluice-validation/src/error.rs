//! Validation error types.

use sluice_core::StoreError;

/// Outcome of a single validator that did not pass.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The object does not satisfy the rule. Collected, never fatal.
    #[error("Invalid file: {message}")]
    Invalid {
        /// Human-readable reason.
        message: String,
    },

    /// The validator could not inspect the object. Aborts validation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ValidationError {
    /// Create a rule failure with `message`.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Errors raised while loading an object for validation.
#[derive(Debug, thiserror::Error)]
pub enum ObjectValidatorError {
    /// No object exists at the key.
    #[error("File {key} was not found.")]
    FileNotFound {
        /// The key that was looked up.
        key: String,
    },

    /// Metadata lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Contradictory or insufficient validator arguments.
#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    /// Neither size bound was given.
    #[error("At least one of `min` or `max` must be defined.")]
    MissingBounds,

    /// The lower size bound is above the upper one.
    #[error("Argument `min` cannot be more than `max`.")]
    MinExceedsMax,

    /// No MIME type, type list or pattern was given.
    #[error("At least one of `mime_type`, `mime_types` or `regex` must be defined.")]
    MissingMimeSelector,

    /// The MIME type pattern does not compile.
    #[error("Invalid MIME type pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}
