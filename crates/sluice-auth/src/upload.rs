//! Signed POST upload policies.
//!
//! [`SignedUploadPolicy`] produces the hidden form fields a browser needs to
//! POST a file straight to a bucket. The fields pin the bucket, key, ACL,
//! size range and success status, and carry a signature over the policy
//! document so the storage service can verify them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use sluice_core::{
    CannedAcl, MisconfiguredError, SignatureVersion, SluiceConfig, StorageCredentials,
};
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::policy::{Condition, PolicyDocument};
use crate::{sigv2, sigv4};

/// Generator for the random key segment used by `randomize`.
pub type IdGenerator = fn() -> String;

fn uuid_v4() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Per-upload overrides. Unset values fall back to the credentials and
/// [`SluiceConfig`].
///
/// # Examples
///
/// ```
/// use sluice_auth::UploadOptions;
/// use sluice_core::CannedAcl;
///
/// let options = UploadOptions::builder()
///     .acl(CannedAcl::Private)
///     .expires_in(3600)
///     .randomize(true)
///     .build();
/// assert_eq!(options.acl, Some(CannedAcl::Private));
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct UploadOptions {
    /// ACL the upload must be sent with. Defaults to the credentials' ACL.
    #[builder(default, setter(strip_option))]
    pub acl: Option<CannedAcl>,

    /// Lifetime of the policy in seconds.
    #[builder(default, setter(strip_option))]
    pub expires_in: Option<u64>,

    /// Status code returned by the storage service on success.
    #[builder(default, setter(strip_option, into))]
    pub success_action_status: Option<String>,

    /// Maximum upload size in bytes. Zero falls back to the configured
    /// maximum.
    #[builder(default, setter(strip_option))]
    pub max_content_length: Option<u64>,

    /// Prepend a random unique segment to the key.
    #[builder(default)]
    pub randomize: bool,

    /// Source of the random segment.
    #[builder(default = uuid_v4 as IdGenerator)]
    pub id_generator: IdGenerator,

    /// Signature scheme override.
    #[builder(default, setter(strip_option))]
    pub signature_version: Option<SignatureVersion>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A signed permission to POST one object to the bucket.
///
/// `Debug` and `Display` show only the key.
///
/// # Examples
///
/// ```
/// use sluice_auth::{SignedUploadPolicy, UploadOptions};
/// use sluice_core::{SignatureVersion, SluiceConfig, StorageCredentials};
///
/// let creds = StorageCredentials::new("AKID", "secret", "uploads");
/// let config = SluiceConfig::builder()
///     .unvalidated_prefix("unvalidated/")
///     .signature_version(SignatureVersion::V2)
///     .build();
///
/// let policy =
///     SignedUploadPolicy::new("a.png", "image/png", &creds, &config, UploadOptions::default())
///         .unwrap();
/// let fields = policy.form_fields();
///
/// assert_eq!(fields["key"], "unvalidated/a.png");
/// assert_eq!(fields["AWSAccessKeyId"], "AKID");
/// assert!(fields.contains_key("Signature"));
/// ```
#[derive(Clone)]
pub struct SignedUploadPolicy {
    key: String,
    mime_type: String,
    access_key: String,
    secret_key: String,
    session_token: Option<String>,
    bucket_name: String,
    region: String,
    acl: CannedAcl,
    expires_in: u64,
    success_action_status: String,
    max_content_length: u64,
    signature_version: SignatureVersion,
}

impl fmt::Debug for SignedUploadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedUploadPolicy")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SignedUploadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl SignedUploadPolicy {
    /// Prepare a policy for uploading `key`.
    ///
    /// The final key is `<unvalidated prefix>[<id>/]<key>`, where the `<id>`
    /// segment is only added when `options.randomize` is set.
    ///
    /// # Errors
    ///
    /// Returns [`MisconfiguredError`] when `credentials` lack any attribute
    /// required for signing.
    pub fn new(
        key: impl Into<String>,
        mime_type: impl Into<String>,
        credentials: &StorageCredentials,
        config: &SluiceConfig,
        options: UploadOptions,
    ) -> Result<Self, MisconfiguredError> {
        credentials.check()?;

        let mut key = key.into();
        if options.randomize {
            key = format!("{}/{key}", (options.id_generator)());
        }
        let key = format!("{}{key}", config.unvalidated_prefix);

        let policy = Self {
            key,
            mime_type: mime_type.into(),
            access_key: credentials.access_key.clone(),
            secret_key: credentials.secret_key.clone(),
            session_token: credentials.session_token.clone(),
            bucket_name: credentials.bucket_name.clone(),
            region: credentials.region.clone(),
            acl: options.acl.or(credentials.acl).unwrap_or_default(),
            expires_in: options.expires_in.unwrap_or(config.expires_in),
            success_action_status: options
                .success_action_status
                .unwrap_or_else(|| config.success_action_status.clone()),
            max_content_length: options
                .max_content_length
                .filter(|&max| max > 0)
                .unwrap_or(config.max_content_length),
            signature_version: options.signature_version.unwrap_or(config.signature_version),
        };
        debug!(
            key = %policy.key,
            bucket = %policy.bucket_name,
            signature_version = %policy.signature_version,
            "prepared upload policy"
        );
        Ok(policy)
    }

    /// The object key the upload is pinned to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The MIME type the caller declared for the upload.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The ACL the upload is pinned to.
    #[must_use]
    pub fn acl(&self) -> CannedAcl {
        self.acl
    }

    /// The signature scheme in use.
    #[must_use]
    pub fn signature_version(&self) -> SignatureVersion {
        self.signature_version
    }

    /// Form fields for a POST issued now.
    #[must_use]
    pub fn form_fields(&self) -> BTreeMap<String, String> {
        self.form_fields_at(Utc::now())
    }

    /// Form fields for a POST issued at `now`.
    #[must_use]
    pub fn form_fields_at(&self, now: DateTime<Utc>) -> BTreeMap<String, String> {
        let policy = self.policy_document_at(now).encode();
        let mut fields = BTreeMap::new();
        fields.insert("acl".to_owned(), self.acl.as_str().to_owned());
        fields.insert("key".to_owned(), self.key.clone());
        fields.insert(
            "success_action_status".to_owned(),
            self.success_action_status.clone(),
        );

        match self.signature_version {
            SignatureVersion::V2 => {
                fields.insert("AWSAccessKeyId".to_owned(), self.access_key.clone());
                fields.insert("Signature".to_owned(), self.signature(&policy, now));
            }
            SignatureVersion::V4 => {
                fields.insert("x-amz-algorithm".to_owned(), sigv4::ALGORITHM.to_owned());
                fields.insert("x-amz-credential".to_owned(), self.credential(&now));
                fields.insert("x-amz-date".to_owned(), sigv4::amz_date(&now));
                fields.insert("x-amz-signature".to_owned(), self.signature(&policy, now));
            }
        }
        if let Some(token) = &self.session_token {
            fields.insert("x-amz-security-token".to_owned(), token.clone());
        }
        fields.insert("Policy".to_owned(), policy);

        debug!(key = %self.key, "generated upload form fields");
        fields
    }

    /// The policy document for a POST issued at `now`.
    #[must_use]
    pub fn policy_document_at(&self, now: DateTime<Utc>) -> PolicyDocument {
        let expiration = i64::try_from(self.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut conditions = Vec::with_capacity(10);
        if self.signature_version == SignatureVersion::V4 {
            conditions.push(Condition::exact("x-amz-algorithm", sigv4::ALGORITHM));
            conditions.push(Condition::exact("x-amz-credential", self.credential(&now)));
            conditions.push(Condition::exact("x-amz-date", sigv4::amz_date(&now)));
            if let Some(token) = &self.session_token {
                conditions.push(Condition::exact("x-amz-security-token", token.as_str()));
            }
        }
        conditions.push(Condition::exact("bucket", self.bucket_name.as_str()));
        conditions.push(Condition::exact("key", self.key.as_str()));
        conditions.push(Condition::exact("acl", self.acl.as_str()));
        conditions.push(Condition::starts_with("Content-Type", ""));
        conditions.push(Condition::ContentLengthRange {
            min: 0,
            max: self.max_content_length,
        });
        conditions.push(Condition::exact(
            "success_action_status",
            self.success_action_status.as_str(),
        ));

        PolicyDocument::new(expiration, conditions)
    }

    /// Sign an encoded policy with the configured scheme. `now` selects the
    /// credential scope date for region-scoped signatures.
    #[must_use]
    pub fn signature(&self, encoded_policy: &str, now: DateTime<Utc>) -> String {
        match self.signature_version {
            SignatureVersion::V2 => sigv2::sign_policy(&self.secret_key, encoded_policy),
            SignatureVersion::V4 => sigv4::sign_policy(
                &self.secret_key,
                &sigv4::date_stamp(&now),
                &self.region,
                encoded_policy,
            ),
        }
    }

    fn credential(&self, now: &DateTime<Utc>) -> String {
        sigv4::credential(&self.access_key, &sigv4::date_stamp(now), &self.region)
    }
}
