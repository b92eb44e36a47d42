//! Shared building blocks for Sluice, a direct-to-bucket upload toolkit.
//!
//! Sluice lets clients upload straight to an S3-compatible bucket with a
//! signed POST policy, then validates and promotes the uploaded object from
//! a temporary key prefix to its final key. This crate holds the pieces the
//! signing and validation crates share:
//!
//! ```text
//!  SluiceConfig + StorageCredentials
//!        |                    |
//!        v                    v
//!  sluice-auth          sluice-validation
//!  (signed POST)        (validate + promote)
//!                             |
//!                             v
//!                       ObjectStore
//!              (InMemoryObjectStore | S3ObjectStore)
//! ```

pub mod acl;
pub mod config;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod object;
#[cfg(feature = "s3")]
pub mod s3;
pub mod store;

pub use acl::CannedAcl;
pub use config::{SignatureVersion, SluiceConfig};
pub use credentials::StorageCredentials;
pub use error::{MisconfiguredError, StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use object::{ObjectHandle, ObjectMetadata};
#[cfg(feature = "s3")]
pub use s3::S3ObjectStore;
pub use store::ObjectStore;
