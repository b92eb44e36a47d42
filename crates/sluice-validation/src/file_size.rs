//! Object size bounds.

use async_trait::async_trait;
use sluice_core::{ObjectHandle, ObjectStore};

use crate::error::{ArgumentError, ValidationError};
use crate::validator::Validator;

/// Accepts objects whose size lies within inclusive byte bounds.
///
/// # Examples
///
/// ```
/// use sluice_validation::FileSize;
///
/// assert!(FileSize::new(Some(1024), Some(2048)).is_ok());
/// assert!(FileSize::new(None, None).is_err());
/// assert!(FileSize::new(Some(10), Some(5)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSize {
    min: Option<u64>,
    max: Option<u64>,
}

impl FileSize {
    /// Create a validator with optional lower and upper bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::MissingBounds`] if both bounds are `None`
    /// and [`ArgumentError::MinExceedsMax`] if `min > max`.
    pub fn new(min: Option<u64>, max: Option<u64>) -> Result<Self, ArgumentError> {
        match (min, max) {
            (None, None) => Err(ArgumentError::MissingBounds),
            (Some(min), Some(max)) if min > max => Err(ArgumentError::MinExceedsMax),
            _ => Ok(Self { min, max }),
        }
    }

    /// Only a lower bound.
    #[must_use]
    pub fn at_least(min: u64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Only an upper bound.
    #[must_use]
    pub fn at_most(max: u64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Lower bound, if any.
    #[must_use]
    pub fn min(&self) -> Option<u64> {
        self.min
    }

    /// Upper bound, if any.
    #[must_use]
    pub fn max(&self) -> Option<u64> {
        self.max
    }

    /// Check a size against the bounds. The lower bound is checked first.
    pub fn check(&self, size: u64) -> Result<(), ValidationError> {
        if let Some(min) = self.min {
            if size < min {
                return Err(ValidationError::invalid(format!(
                    "File is smaller than {min} bytes."
                )));
            }
        }
        if let Some(max) = self.max {
            if size > max {
                return Err(ValidationError::invalid(format!(
                    "File is bigger than {max} bytes."
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Validator for FileSize {
    async fn validate(
        &self,
        object: &ObjectHandle,
        _store: &dyn ObjectStore,
    ) -> Result<(), ValidationError> {
        self.check(object.size())
    }
}
