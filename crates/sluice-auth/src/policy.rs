//! POST policy documents.
//!
//! A policy document lists the conditions a browser-based POST upload must
//! satisfy and when the permission expires:
//!
//! ```text
//! {"expiration":"2007-12-01T13:05:37.572123Z",
//!  "conditions":[{"bucket":"b"},["starts-with","$Content-Type",""],
//!                ["content-length-range",0,20971520]]}
//! ```
//!
//! The document is serialized as compact JSON and base64-encoded before it
//! is signed and sent as the `Policy` form field.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Timestamp layout of the `expiration` field.
const EXPIRATION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// A single policy condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Form field `name` must equal `value`. Serialized as `{"name": "value"}`.
    Exact {
        /// Form field name.
        name: String,
        /// Required value.
        value: String,
    },
    /// Form field `name` must start with `prefix`. Serialized as
    /// `["starts-with", "$name", "prefix"]`.
    StartsWith {
        /// Form field name, without the leading `$`.
        name: String,
        /// Required prefix. Empty accepts any value.
        prefix: String,
    },
    /// Uploaded content must be between `min` and `max` bytes inclusive.
    ContentLengthRange {
        /// Minimum size in bytes.
        min: u64,
        /// Maximum size in bytes.
        max: u64,
    },
}

impl Condition {
    /// Build an exact-match condition.
    #[must_use]
    pub fn exact(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Exact {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Build a prefix-match condition.
    #[must_use]
    pub fn starts_with(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::StartsWith {
            name: name.into(),
            prefix: prefix.into(),
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Exact { name, value } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(name, value)?;
                map.end()
            }
            Self::StartsWith { name, prefix } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element("starts-with")?;
                seq.serialize_element(&format!("${name}"))?;
                seq.serialize_element(prefix)?;
                seq.end()
            }
            Self::ContentLengthRange { min, max } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element("content-length-range")?;
                seq.serialize_element(min)?;
                seq.serialize_element(max)?;
                seq.end()
            }
        }
    }
}

/// An expiring list of upload conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    /// When the policy stops being accepted.
    #[serde(serialize_with = "serialize_expiration")]
    pub expiration: DateTime<Utc>,
    /// Conditions, in the order they are emitted.
    pub conditions: Vec<Condition>,
}

fn serialize_expiration<S: Serializer>(
    expiration: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&expiration.format(EXPIRATION_FORMAT))
}

impl PolicyDocument {
    /// Create a policy that expires at `expiration`.
    #[must_use]
    pub fn new(expiration: DateTime<Utc>, conditions: Vec<Condition>) -> Self {
        Self {
            expiration,
            conditions,
        }
    }

    /// The `expiration` value as it appears in the document.
    #[must_use]
    pub fn expiration_string(&self) -> String {
        self.expiration.format(EXPIRATION_FORMAT).to_string()
    }

    /// Compact JSON rendering of the document.
    #[must_use]
    pub fn to_json(&self) -> String {
        // Only strings and integers are serialized, so this cannot fail.
        serde_json::to_string(self).expect("policy document is always serializable")
    }

    /// Base64 of the compact JSON, the value of the `Policy` form field.
    #[must_use]
    pub fn encode(&self) -> String {
        BASE64.encode(self.to_json())
    }
}
