//! Object metadata and handles.

use serde::{Deserialize, Serialize};

/// Metadata reported by a store for an existing object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Object size in bytes.
    pub size: u64,
    /// Content type declared at upload time. Client-supplied and untrusted.
    pub content_type: Option<String>,
}

/// Reference to an object known to exist in the store.
///
/// A handle is only built from the metadata of an object that was found,
/// so holding one means the object existed when it was loaded. Promotion
/// never mutates a handle: it produces a new one for the new key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHandle {
    key: String,
    size: u64,
    content_type: Option<String>,
}

impl ObjectHandle {
    /// Build a handle for `key` from the metadata the store returned.
    #[must_use]
    pub fn new(key: impl Into<String>, metadata: ObjectMetadata) -> Self {
        Self {
            key: key.into(),
            size: metadata.size,
            content_type: metadata.content_type,
        }
    }

    /// The full object key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The object size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The declared content type, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Consume this handle and return one for the same content at `key`.
    #[must_use]
    pub fn relocate(self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..self
        }
    }
}
