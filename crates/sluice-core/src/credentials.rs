//! Storage credentials used to sign upload policies.
//!
//! [`StorageCredentials`] bundles the access key pair, optional session
//! token, target bucket, default ACL and region. [`StorageCredentials::check`]
//! verifies that everything required for signing is present before any
//! signature is computed.

use std::fmt;

use crate::acl::CannedAcl;
use crate::error::MisconfiguredError;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Credentials and bucket attributes for the upload target.
///
/// `Debug` output redacts the secret key and session token.
///
/// # Examples
///
/// ```
/// use sluice_core::credentials::StorageCredentials;
///
/// let creds = StorageCredentials::new("AKID", "secret", "uploads");
/// assert!(creds.check().is_ok());
///
/// let empty = StorageCredentials::default();
/// assert_eq!(
///     empty.check().unwrap_err().missing(),
///     &["access_key", "bucket_name", "secret_key"]
/// );
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct StorageCredentials {
    /// Access key ID.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
    /// Name of the target bucket.
    pub bucket_name: String,
    /// ACL uploads are pinned to unless overridden per upload.
    pub acl: Option<CannedAcl>,
    /// Region of the bucket (region-scoped signatures only).
    pub region: String,
}

impl Default for StorageCredentials {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            secret_key: String::new(),
            session_token: None,
            bucket_name: String::new(),
            acl: Some(CannedAcl::default()),
            region: DEFAULT_REGION.to_owned(),
        }
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("bucket_name", &self.bucket_name)
            .field("acl", &self.acl)
            .field("region", &self.region)
            .finish()
    }
}

impl StorageCredentials {
    /// Create credentials for `bucket_name` with the default ACL and region.
    #[must_use]
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        bucket_name: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            bucket_name: bucket_name.into(),
            ..Self::default()
        }
    }

    /// Set the region of the bucket.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the default ACL for uploads.
    #[must_use]
    pub fn with_acl(mut self, acl: CannedAcl) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Attach a session token for temporary credentials.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Load credentials from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `AWS_ACCESS_KEY_ID` | *(empty)* |
    /// | `AWS_SECRET_ACCESS_KEY` | *(empty)* |
    /// | `AWS_SESSION_TOKEN` | *(unset)* |
    /// | `AWS_STORAGE_BUCKET_NAME` | *(empty)* |
    /// | `AWS_DEFAULT_ACL` | `public-read` |
    /// | `AWS_REGION` / `AWS_DEFAULT_REGION` | `us-east-1` |
    ///
    /// Missing values are reported by [`check`](Self::check), not here.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut creds = Self::default();

        if let Some(v) = lookup("AWS_ACCESS_KEY_ID") {
            creds.access_key = v;
        }
        if let Some(v) = lookup("AWS_SECRET_ACCESS_KEY") {
            creds.secret_key = v;
        }
        creds.session_token = lookup("AWS_SESSION_TOKEN").filter(|v| !v.is_empty());
        if let Some(v) = lookup("AWS_STORAGE_BUCKET_NAME") {
            creds.bucket_name = v;
        }
        if let Some(v) = lookup("AWS_DEFAULT_ACL") {
            if let Ok(acl) = v.parse() {
                creds.acl = Some(acl);
            }
        }
        if let Some(v) = lookup("AWS_REGION").or_else(|| lookup("AWS_DEFAULT_REGION")) {
            creds.region = v;
        }

        creds
    }

    /// Verify that every attribute required for signing is present.
    ///
    /// # Errors
    ///
    /// Returns [`MisconfiguredError`] listing the missing attributes among
    /// `access_key`, `bucket_name`, `acl` and `secret_key`.
    pub fn check(&self) -> Result<(), MisconfiguredError> {
        let mut missing = Vec::new();
        if self.access_key.is_empty() {
            missing.push("access_key");
        }
        if self.bucket_name.is_empty() {
            missing.push("bucket_name");
        }
        if self.acl.is_none() {
            missing.push("acl");
        }
        if self.secret_key.is_empty() {
            missing.push("secret_key");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MisconfiguredError::new(missing))
        }
    }
}
