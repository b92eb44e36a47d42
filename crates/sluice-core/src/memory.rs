//! In-memory object store.
//!
//! [`InMemoryObjectStore`] keeps one bucket worth of objects in a
//! [`DashMap`]. It is meant for development and tests: it honours the full
//! [`ObjectStore`] contract, including ACL tracking, but never persists
//! anything.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::{debug, trace};

use crate::acl::CannedAcl;
use crate::error::{StoreError, StoreResult};
use crate::object::ObjectMetadata;
use crate::store::ObjectStore;

/// A stored object: body, declared content type and ACL.
#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    acl: CannedAcl,
}

impl std::fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredObject")
            .field("size", &self.data.len())
            .field("content_type", &self.content_type)
            .field("acl", &self.acl)
            .finish()
    }
}

/// Thread-safe in-memory bucket.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use sluice_core::{InMemoryObjectStore, ObjectStore};
///
/// # tokio_test::block_on(async {
/// let store = InMemoryObjectStore::new("test-bucket");
/// store.put_object("hello.txt", Bytes::from("hello"), Some("text/plain"));
///
/// let meta = store.head_object("hello.txt").await.unwrap().unwrap();
/// assert_eq!(meta.size, 5);
///
/// store.copy_object("hello.txt", "copy.txt").await.unwrap();
/// let data = store.read_object("copy.txt").await.unwrap();
/// assert_eq!(data.as_ref(), b"hello");
/// # });
/// ```
pub struct InMemoryObjectStore {
    bucket: String,
    objects: DashMap<String, StoredObject>,
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("bucket", &self.bucket)
            .field("objects_count", &self.objects.len())
            .finish()
    }
}

impl InMemoryObjectStore {
    /// Create an empty bucket named `bucket`.
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        debug!(bucket = %bucket, "creating InMemoryObjectStore");
        Self {
            bucket,
            objects: DashMap::new(),
        }
    }

    /// Store `data` under `key` with the default ACL, replacing any
    /// existing object.
    pub fn put_object(&self, key: &str, data: Bytes, content_type: Option<&str>) {
        trace!(bucket = %self.bucket, key, size = data.len(), "stored object data");
        self.objects.insert(
            key.to_owned(),
            StoredObject {
                data,
                content_type: content_type.map(ToOwned::to_owned),
                acl: CannedAcl::default(),
            },
        );
    }

    /// Whether an object exists at `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    /// The ACL currently applied to `key`.
    #[must_use]
    pub fn object_acl(&self, key: &str) -> Option<CannedAcl> {
        self.objects.get(key).map(|entry| entry.acl)
    }

    /// All keys in the bucket, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove every object.
    pub fn reset(&self) {
        self.objects.clear();
        debug!(bucket = %self.bucket, "reset all objects");
    }

    fn get(&self, key: &str) -> StoreResult<StoredObject> {
        self.objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NoSuchKey {
                key: key.to_owned(),
            })
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    fn bucket_name(&self) -> &str {
        &self.bucket
    }

    async fn head_object(&self, key: &str) -> StoreResult<Option<ObjectMetadata>> {
        Ok(self.objects.get(key).map(|entry| ObjectMetadata {
            size: entry.data.len() as u64,
            content_type: entry.content_type.clone(),
        }))
    }

    async fn read_object(&self, key: &str) -> StoreResult<Bytes> {
        Ok(self.get(key)?.data)
    }

    async fn read_object_prefix(&self, key: &str, len: usize) -> StoreResult<Bytes> {
        let data = self.get(key)?.data;
        Ok(data.slice(..len.min(data.len())))
    }

    async fn copy_object(&self, src_key: &str, dst_key: &str) -> StoreResult<()> {
        let source = self.get(src_key)?;
        debug!(
            bucket = %self.bucket,
            src_key,
            dst_key,
            size = source.data.len(),
            "copying object"
        );
        self.objects.insert(dst_key.to_owned(), source);
        Ok(())
    }

    async fn set_object_acl(&self, key: &str, acl: CannedAcl) -> StoreResult<()> {
        let mut entry = self
            .objects
            .get_mut(key)
            .ok_or_else(|| StoreError::NoSuchKey {
                key: key.to_owned(),
            })?;
        entry.acl = acl;
        trace!(bucket = %self.bucket, key, %acl, "set object ACL");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> StoreResult<()> {
        if self.objects.remove(key).is_some() {
            trace!(bucket = %self.bucket, key, "deleted object");
        }
        Ok(())
    }
}
