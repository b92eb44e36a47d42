//! Error types shared by the Sluice crates.
//!
//! [`StoreError`] covers failures reported by an [`ObjectStore`](crate::ObjectStore)
//! backend. Callers never recover from these inside Sluice: they propagate to
//! whoever drives the upload flow. [`MisconfiguredError`] is raised when the
//! storage credentials lack attributes required for signing.
//!
//! # Usage
//!
//! ```
//! use sluice_core::error::MisconfiguredError;
//!
//! let err = MisconfiguredError::new(vec!["access_key", "bucket_name"]);
//! assert_eq!(
//!     err.to_string(),
//!     "Storage credentials missing attributes for AWS. Missing attributes: access_key, bucket_name."
//! );
//! ```

/// Errors reported by an object-store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The specified key does not exist.
    #[error("The specified key does not exist: {key}")]
    NoSuchKey {
        /// The key that was not found.
        key: String,
    },

    /// The backend rejected the request.
    #[error("{operation} failed for key {key}: {message}")]
    Rejected {
        /// The store operation that failed (e.g. `"CopyObject"`).
        operation: &'static str,
        /// The key the operation targeted.
        key: String,
        /// Backend-provided description.
        message: String,
    },

    /// Transport or backend failure with context.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Convenience result type for object-store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// The storage credentials lack attributes required to sign uploads.
///
/// Lists only the attributes that are actually missing, in the order
/// `access_key`, `bucket_name`, `acl`, `secret_key`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Storage credentials missing attributes for AWS. Missing attributes: {}.",
    .missing.join(", ")
)]
pub struct MisconfiguredError {
    missing: Vec<&'static str>,
}

impl MisconfiguredError {
    /// Create an error for the given missing attribute names.
    #[must_use]
    pub fn new(missing: Vec<&'static str>) -> Self {
        Self { missing }
    }

    /// The names of the missing attributes.
    #[must_use]
    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }
}
