//! Upload configuration.
//!
//! Provides [`SluiceConfig`], the process-wide settings shared by upload
//! signing and validation. Nothing in Sluice reads the environment behind
//! the caller's back: load a config once (for example with
//! [`SluiceConfig::from_env`]) and pass it to the components that need it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Default upper bound for an uploaded file: 20 MiB.
pub const DEFAULT_MAX_CONTENT_LENGTH: u64 = 20_971_520;

/// Default lifetime of a signed upload policy, in seconds.
pub const DEFAULT_EXPIRES_IN: u64 = 60;

/// Signature scheme used for upload policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureVersion {
    /// Legacy single-key HMAC-SHA1 signatures (`AWSAccessKeyId` + `Signature`).
    V2,
    /// Region-scoped HMAC-SHA256 signatures (`x-amz-*` fields).
    #[default]
    V4,
}

impl fmt::Display for SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2 => f.write_str("v2"),
            Self::V4 => f.write_str("v4"),
        }
    }
}

impl FromStr for SignatureVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v2" | "2" => Ok(Self::V2),
            "v4" | "4" => Ok(Self::V4),
            other => Err(format!("unknown signature version: {other}")),
        }
    }
}

/// Upload signing and validation configuration.
///
/// # Examples
///
/// ```
/// use sluice_core::config::{SignatureVersion, SluiceConfig};
///
/// let config = SluiceConfig::default();
/// assert_eq!(config.unvalidated_prefix, "");
/// assert_eq!(config.max_content_length, 20_971_520);
/// assert_eq!(config.signature_version, SignatureVersion::V4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct SluiceConfig {
    /// Prefix prepended to every signed upload key and stripped on promotion.
    /// Empty disables promotion.
    #[builder(default, setter(into))]
    pub unvalidated_prefix: String,

    /// Default maximum upload size in bytes.
    #[builder(default = DEFAULT_MAX_CONTENT_LENGTH)]
    pub max_content_length: u64,

    /// Default lifetime of a signed upload policy, in seconds.
    #[builder(default = DEFAULT_EXPIRES_IN)]
    pub expires_in: u64,

    /// Status code the storage service answers a successful POST with.
    #[builder(default = String::from("201"), setter(into))]
    pub success_action_status: String,

    /// Signature scheme for upload policies.
    #[builder(default)]
    pub signature_version: SignatureVersion,
}

impl Default for SluiceConfig {
    fn default() -> Self {
        Self {
            unvalidated_prefix: String::new(),
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            expires_in: DEFAULT_EXPIRES_IN,
            success_action_status: String::from("201"),
            signature_version: SignatureVersion::default(),
        }
    }
}

impl SluiceConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `UNVALIDATED_KEY_PREFIX` | *(empty)* |
    /// | `MAX_CONTENT_LENGTH` | `20971520` |
    /// | `UPLOAD_EXPIRES_IN` | `60` |
    /// | `SUCCESS_ACTION_STATUS` | `201` |
    /// | `SIGNATURE_VERSION` | `v4` |
    ///
    /// Values that fail to parse keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("UNVALIDATED_KEY_PREFIX") {
            config.unvalidated_prefix = v;
        }
        if let Some(v) = lookup("MAX_CONTENT_LENGTH") {
            if let Ok(n) = v.parse::<u64>() {
                config.max_content_length = n;
            }
        }
        if let Some(v) = lookup("UPLOAD_EXPIRES_IN") {
            if let Ok(n) = v.parse::<u64>() {
                config.expires_in = n;
            }
        }
        if let Some(v) = lookup("SUCCESS_ACTION_STATUS") {
            config.success_action_status = v;
        }
        if let Some(v) = lookup("SIGNATURE_VERSION") {
            if let Ok(version) = v.parse() {
                config.signature_version = version;
            }
        }

        config
    }
}
