//! Signed POST upload policies for S3-compatible buckets.
//!
//! A browser-based POST upload carries a base64 policy document and a
//! signature over it. This crate builds both, for two schemes:
//!
//! - [`sigv2`]: legacy HMAC-SHA1 signatures (`AWSAccessKeyId`, `Signature`)
//! - [`sigv4`]: region-scoped HMAC-SHA256 signatures (`x-amz-*` fields)
//!
//! [`SignedUploadPolicy`] ties them together with the key derivation and
//! policy conditions, and hands back the form fields a client posts along
//! with the file.

pub mod policy;
pub mod sigv2;
pub mod sigv4;
pub mod upload;

pub use policy::{Condition, PolicyDocument};
pub use upload::{IdGenerator, SignedUploadPolicy, UploadOptions};
