//! Object-store abstraction.
//!
//! [`ObjectStore`] is the narrow capability set Sluice needs from a bucket:
//! metadata lookup, reads, server-side copy, ACL updates and deletes. Every
//! call is attempted exactly once; retries and timeouts belong to the
//! backend or the caller.

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;

use crate::acl::CannedAcl;
use crate::error::StoreResult;
use crate::object::ObjectMetadata;

/// A single bucket in an object store.
#[async_trait]
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// The name of the bucket this store operates on.
    fn bucket_name(&self) -> &str;

    /// Fetch metadata for `key`, or `None` if the object does not exist.
    async fn head_object(&self, key: &str) -> StoreResult<Option<ObjectMetadata>>;

    /// Read the full body of `key`.
    async fn read_object(&self, key: &str) -> StoreResult<Bytes>;

    /// Read at most the first `len` bytes of `key`.
    ///
    /// The default implementation reads the whole object and truncates it;
    /// backends that support ranged reads should override it.
    async fn read_object_prefix(&self, key: &str, len: usize) -> StoreResult<Bytes> {
        let mut data = self.read_object(key).await?;
        data.truncate(len);
        Ok(data)
    }

    /// Copy `src_key` to `dst_key` within the bucket.
    async fn copy_object(&self, src_key: &str, dst_key: &str) -> StoreResult<()>;

    /// Replace the ACL of `key`.
    async fn set_object_acl(&self, key: &str, acl: CannedAcl) -> StoreResult<()>;

    /// Delete `key`.
    async fn delete_object(&self, key: &str) -> StoreResult<()>;
}
