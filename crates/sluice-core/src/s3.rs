//! Amazon S3 backed object store.
//!
//! Available with the `s3` feature. Every [`ObjectStore`] call maps to one
//! S3 API request on the configured bucket.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::types::ObjectCannedAcl;
use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, trace};

use crate::acl::CannedAcl;
use crate::error::{StoreError, StoreResult};
use crate::object::ObjectMetadata;
use crate::store::ObjectStore;

/// Characters left as-is in the `x-amz-copy-source` header.
const COPY_SOURCE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// An S3 bucket accessed through the AWS SDK.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Wrap `client` for operations on `bucket`.
    #[must_use]
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// The underlying SDK client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn rejected<E, R>(operation: &'static str, key: &str, err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    match err {
        SdkError::ServiceError(_) => StoreError::Rejected {
            operation,
            key: key.to_owned(),
            message: DisplayErrorContext(&err).to_string(),
        },
        other => StoreError::Backend(anyhow::Error::new(other)),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket_name(&self) -> &str {
        &self.bucket
    }

    async fn head_object(&self, key: &str) -> StoreResult<Option<ObjectMetadata>> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => Ok(Some(ObjectMetadata {
                size: output
                    .content_length()
                    .and_then(|n| u64::try_from(n).ok())
                    .unwrap_or_default(),
                content_type: output.content_type().map(ToOwned::to_owned),
            })),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => {
                trace!(bucket = %self.bucket, key, "object not found");
                Ok(None)
            }
            Err(err) => Err(rejected("HeadObject", key, err)),
        }
    }

    async fn read_object(&self, key: &str) -> StoreResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| rejected("GetObject", key, err))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|err| StoreError::Backend(anyhow::Error::new(err)))?;
        Ok(data.into_bytes())
    }

    async fn read_object_prefix(&self, key: &str, len: usize) -> StoreResult<Bytes> {
        if len == 0 {
            return Ok(Bytes::new());
        }

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .range(format!("bytes=0-{}", len - 1))
            .send()
            .await
            .map_err(|err| rejected("GetObject", key, err))?;

        let mut data = output
            .body
            .collect()
            .await
            .map_err(|err| StoreError::Backend(anyhow::Error::new(err)))?
            .into_bytes();
        data.truncate(len);
        Ok(data)
    }

    async fn copy_object(&self, src_key: &str, dst_key: &str) -> StoreResult<()> {
        let source = utf8_percent_encode(&format!("{}/{src_key}", self.bucket), COPY_SOURCE)
            .to_string();
        debug!(bucket = %self.bucket, src_key, dst_key, "copying object");

        self.client
            .copy_object()
            .bucket(&self.bucket)
            .key(dst_key)
            .copy_source(source)
            .send()
            .await
            .map_err(|err| rejected("CopyObject", src_key, err))?;
        Ok(())
    }

    async fn set_object_acl(&self, key: &str, acl: CannedAcl) -> StoreResult<()> {
        self.client
            .put_object_acl()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::from(acl.as_str()))
            .send()
            .await
            .map_err(|err| rejected("PutObjectAcl", key, err))?;
        trace!(bucket = %self.bucket, key, %acl, "set object ACL");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| rejected("DeleteObject", key, err))?;
        trace!(bucket = %self.bucket, key, "deleted object");
        Ok(())
    }
}
