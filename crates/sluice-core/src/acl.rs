//! Canned access-control policies applied to uploaded and promoted objects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Predefined (canned) ACL applied to an S3 object.
///
/// Upload policies pin the ACL a client must send with its POST, and
/// promotion re-applies an ACL to the validated copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    /// Owner gets `FULL_CONTROL`. No one else has access rights.
    Private,
    /// Owner gets `FULL_CONTROL`. The `AllUsers` group gets `READ` access.
    #[default]
    PublicRead,
    /// Owner gets `FULL_CONTROL`. The `AllUsers` group gets `READ` and `WRITE` access.
    PublicReadWrite,
    /// Owner gets `FULL_CONTROL`. The `AuthenticatedUsers` group gets `READ` access.
    AuthenticatedRead,
    /// Object owner gets `FULL_CONTROL`. Bucket owner gets `READ` access.
    BucketOwnerRead,
    /// Both the object owner and the bucket owner get `FULL_CONTROL`.
    BucketOwnerFullControl,
}

impl CannedAcl {
    /// Return the wire representation of the canned ACL.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
            Self::PublicReadWrite => "public-read-write",
            Self::AuthenticatedRead => "authenticated-read",
            Self::BucketOwnerRead => "bucket-owner-read",
            Self::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`CannedAcl`] from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown canned ACL: {0}")]
pub struct ParseCannedAclError(String);

impl FromStr for CannedAcl {
    type Err = ParseCannedAclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public-read" => Ok(Self::PublicRead),
            "public-read-write" => Ok(Self::PublicReadWrite),
            "authenticated-read" => Ok(Self::AuthenticatedRead),
            "bucket-owner-read" => Ok(Self::BucketOwnerRead),
            "bucket-owner-full-control" => Ok(Self::BucketOwnerFullControl),
            _ => Err(ParseCannedAclError(s.to_owned())),
        }
    }
}
