//! Validate an uploaded object and promote it out of the unvalidated prefix.
//!
//! Uploads land under an "unvalidated" key prefix that a bucket lifecycle
//! rule can expire. Once every validator passes, the object is promoted:
//!
//! ```text
//! unvalidated-uploads/images/a.png
//!   1. copy    -> <new_file_prefix>images/a.png
//!   2. set ACL -> new_file_acl on the copy
//!   3. delete  -> the original (when delete_unvalidated_file)
//! ```
//!
//! Promotion is not atomic and nothing is rolled back: a store failure
//! between steps propagates and leaves whatever state the completed steps
//! produced.

use std::fmt;
use std::sync::Arc;

use sluice_core::{CannedAcl, ObjectHandle, ObjectStore, SluiceConfig, StoreError};
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

use crate::error::{ObjectValidatorError, ValidationError};
use crate::validator::Validator;

/// How validated objects are promoted.
///
/// # Examples
///
/// ```
/// use sluice_core::CannedAcl;
/// use sluice_validation::ValidatorSettings;
///
/// let settings = ValidatorSettings::builder()
///     .unvalidated_prefix("unvalidated-uploads/")
///     .new_file_prefix("validated/")
///     .new_file_acl(CannedAcl::Private)
///     .build();
/// assert!(settings.delete_unvalidated_file);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct ValidatorSettings {
    /// Prefix marking objects that still need promotion. Empty disables
    /// promotion.
    #[builder(default, setter(into))]
    pub unvalidated_prefix: String,

    /// Delete the original after copying it.
    #[builder(default = true)]
    pub delete_unvalidated_file: bool,

    /// Prefix put in place of the unvalidated prefix.
    #[builder(default, setter(into))]
    pub new_file_prefix: String,

    /// ACL applied to the promoted copy.
    #[builder(default)]
    pub new_file_acl: CannedAcl,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl From<&SluiceConfig> for ValidatorSettings {
    fn from(config: &SluiceConfig) -> Self {
        Self::builder()
            .unvalidated_prefix(config.unvalidated_prefix.clone())
            .build()
    }
}

/// Runs validators against one stored object and promotes it when valid.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use bytes::Bytes;
/// use sluice_core::InMemoryObjectStore;
/// use sluice_validation::{FileSize, ObjectValidator, Validator, ValidatorSettings};
///
/// # tokio_test::block_on(async {
/// let store = Arc::new(InMemoryObjectStore::new("uploads"));
/// store.put_object("unvalidated/x.png", Bytes::from_static(b"12345"), None);
///
/// let validators: Vec<Box<dyn Validator>> = vec![Box::new(FileSize::at_most(100))];
/// let settings = ValidatorSettings::builder()
///     .unvalidated_prefix("unvalidated/")
///     .build();
///
/// let mut validator =
///     ObjectValidator::new("unvalidated/x.png", store.clone(), validators, settings)
///         .await
///         .unwrap();
///
/// assert!(validator.validate().await.unwrap());
/// assert_eq!(validator.object().key(), "x.png");
/// assert!(!store.contains("unvalidated/x.png"));
/// # });
/// ```
pub struct ObjectValidator {
    object: ObjectHandle,
    store: Arc<dyn ObjectStore>,
    validators: Vec<Box<dyn Validator>>,
    settings: ValidatorSettings,
    errors: Vec<String>,
}

impl fmt::Debug for ObjectValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectValidator")
            .field("key", &self.object.key())
            .finish_non_exhaustive()
    }
}

impl ObjectValidator {
    /// Load `key` from `store` and prepare `validators` for it.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectValidatorError::FileNotFound`] when no object exists
    /// at `key`, or [`ObjectValidatorError::Store`] when the lookup fails.
    pub async fn new(
        key: impl Into<String>,
        store: Arc<dyn ObjectStore>,
        validators: Vec<Box<dyn Validator>>,
        settings: ValidatorSettings,
    ) -> Result<Self, ObjectValidatorError> {
        let key = key.into();
        let Some(metadata) = store.head_object(&key).await? else {
            debug!(bucket = store.bucket_name(), key = %key, "object to validate not found");
            return Err(ObjectValidatorError::FileNotFound { key });
        };

        Ok(Self {
            object: ObjectHandle::new(key, metadata),
            store,
            validators,
            settings,
            errors: Vec::new(),
        })
    }

    /// The object being validated. Points at the promoted key after a
    /// successful promotion.
    #[must_use]
    pub fn object(&self) -> &ObjectHandle {
        &self.object
    }

    /// Failure messages from the last [`validate`](Self::validate) call, in
    /// validator order.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// The promotion settings.
    #[must_use]
    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    /// Run every validator, then promote the object if all passed and its
    /// key carries the unvalidated prefix.
    ///
    /// Returns whether the object is valid. Rule failures are collected in
    /// [`errors`](Self::errors); they never stop later validators.
    ///
    /// # Errors
    ///
    /// Returns the [`StoreError`] of a validator that could not read the
    /// object, or of a failed promotion step.
    pub async fn validate(&mut self) -> Result<bool, StoreError> {
        self.errors.clear();

        for validator in &self.validators {
            match validator.validate(&self.object, self.store.as_ref()).await {
                Ok(()) => {}
                Err(ValidationError::Invalid { message }) => {
                    debug!(key = self.object.key(), ?validator, %message, "validation failed");
                    self.errors.push(message);
                }
                Err(ValidationError::Store(err)) => return Err(err),
            }
        }

        if self.errors.is_empty() && self.has_unvalidated_prefix() {
            self.promote().await?;
        }

        Ok(self.errors.is_empty())
    }

    fn has_unvalidated_prefix(&self) -> bool {
        let prefix = &self.settings.unvalidated_prefix;
        !prefix.is_empty() && self.object.key().starts_with(prefix.as_str())
    }

    async fn promote(&mut self) -> Result<(), StoreError> {
        let old_key = self.object.key().to_owned();
        let new_key = format!(
            "{}{}",
            self.settings.new_file_prefix,
            &old_key[self.settings.unvalidated_prefix.len()..]
        );
        debug!(
            bucket = self.store.bucket_name(),
            old_key = %old_key,
            new_key = %new_key,
            "promoting validated object"
        );

        if new_key == old_key {
            return self
                .store
                .set_object_acl(&old_key, self.settings.new_file_acl)
                .await
                .inspect_err(|err| warn!(key = %old_key, %err, "setting ACL failed"));
        }

        self.store
            .copy_object(&old_key, &new_key)
            .await
            .inspect_err(|err| warn!(old_key = %old_key, new_key = %new_key, %err, "copy failed"))?;
        self.store
            .set_object_acl(&new_key, self.settings.new_file_acl)
            .await
            .inspect_err(|err| {
                warn!(new_key = %new_key, %err, "setting ACL failed, copy left in place");
            })?;
        if self.settings.delete_unvalidated_file {
            self.store.delete_object(&old_key).await.inspect_err(|err| {
                warn!(old_key = %old_key, %err, "delete failed, both objects left in place");
            })?;
        }

        self.object = self.object.clone().relocate(new_key);
        Ok(())
    }
}
