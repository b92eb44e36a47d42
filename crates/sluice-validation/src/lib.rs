//! Validation and promotion of uploaded objects.
//!
//! After a client uploads straight to the bucket, the application loads the
//! object with an [`ObjectValidator`], runs its [`Validator`]s and, when all
//! of them pass, promotes the object out of the unvalidated key prefix.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use bytes::Bytes;
//! use sluice_core::InMemoryObjectStore;
//! use sluice_validation::{
//!     DenyMimeType, FileSize, ObjectValidator, Validator, ValidatorSettings,
//! };
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(InMemoryObjectStore::new("uploads"));
//! store.put_object("unvalidated/notes.txt", Bytes::from_static(b"hello"), None);
//!
//! let validators: Vec<Box<dyn Validator>> = vec![
//!     Box::new(FileSize::new(Some(1), Some(1024)).unwrap()),
//!     Box::new(DenyMimeType::matching("application/.*").unwrap()),
//! ];
//! let settings = ValidatorSettings::builder()
//!     .unvalidated_prefix("unvalidated/")
//!     .build();
//!
//! let mut validator = ObjectValidator::new("unvalidated/notes.txt", store, validators, settings)
//!     .await
//!     .unwrap();
//! assert!(validator.validate().await.unwrap());
//! assert_eq!(validator.object().key(), "notes.txt");
//! # });
//! ```

pub mod error;
pub mod file_size;
pub mod mime;
pub mod object_validator;
pub mod validator;

pub use error::{ArgumentError, ObjectValidatorError, ValidationError};
pub use file_size::FileSize;
pub use mime::{DenyMimeType, MimeType, detect_mime};
pub use object_validator::{ObjectValidator, ValidatorSettings};
pub use validator::{FnValidator, Validator, validator_fn};
