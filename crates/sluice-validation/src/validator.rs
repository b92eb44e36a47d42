//! The validator abstraction.
//!
//! A [`Validator`] is a stateless rule evaluated against an uploaded object.
//! Built-in rules live in [`file_size`](crate::file_size) and
//! [`mime`](crate::mime); ad-hoc rules can be written as closures with
//! [`validator_fn`].

use std::fmt;

use async_trait::async_trait;
use sluice_core::{ObjectHandle, ObjectStore};

use crate::error::ValidationError;

/// A rule an uploaded object must satisfy.
#[async_trait]
pub trait Validator: Send + Sync + fmt::Debug {
    /// Check `object`, reading its content through `store` when needed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Invalid`] when the object breaks the rule,
    /// or [`ValidationError::Store`] when it could not be inspected.
    async fn validate(
        &self,
        object: &ObjectHandle,
        store: &dyn ObjectStore,
    ) -> Result<(), ValidationError>;
}

/// A validator backed by a closure over the object handle.
pub struct FnValidator<F> {
    name: &'static str,
    check: F,
}

impl<F> fmt::Debug for FnValidator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValidator")
            .field("name", &self.name)
            .finish()
    }
}

/// Wrap `check` as a named [`Validator`].
///
/// # Examples
///
/// ```
/// use sluice_validation::{ValidationError, validator_fn};
///
/// let images_only = validator_fn("images_only", |object| {
///     if object.key().ends_with(".png") {
///         Ok(())
///     } else {
///         Err(ValidationError::invalid("Only PNG files are accepted."))
///     }
/// });
/// assert_eq!(format!("{images_only:?}"), r#"FnValidator { name: "images_only" }"#);
/// ```
pub fn validator_fn<F>(name: &'static str, check: F) -> FnValidator<F>
where
    F: Fn(&ObjectHandle) -> Result<(), ValidationError> + Send + Sync,
{
    FnValidator { name, check }
}

#[async_trait]
impl<F> Validator for FnValidator<F>
where
    F: Fn(&ObjectHandle) -> Result<(), ValidationError> + Send + Sync,
{
    async fn validate(
        &self,
        object: &ObjectHandle,
        _store: &dyn ObjectStore,
    ) -> Result<(), ValidationError> {
        (self.check)(object)
    }
}
