//! `S3ObjectStore` against a live endpoint.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::Permission;
    use sluice_core::{CannedAcl, ObjectStore, S3ObjectStore};
    use sluice_validation::{FileSize, MimeType, ObjectValidator, Validator, ValidatorSettings};

    use crate::{cleanup_bucket, create_test_bucket, s3_client};

    const PNG: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    ];

    async fn put(client: &aws_sdk_s3::Client, bucket: &str, key: &str, body: &'static [u8]) {
        client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from_static(body))
            .content_type("image/png")
            .send()
            .await
            .expect("put_object");
    }

    #[tokio::test]
    #[ignore = "requires running S3 endpoint"]
    async fn test_should_head_and_read_prefix() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "sluice-head").await;
        put(&client, &bucket, "a.png", PNG).await;
        let store = S3ObjectStore::new(client.clone(), &bucket);

        let meta = store
            .head_object("a.png")
            .await
            .expect("head_object")
            .expect("object exists");
        assert_eq!(meta.size, PNG.len() as u64);
        assert_eq!(meta.content_type.as_deref(), Some("image/png"));
        assert!(store.head_object("missing.png").await.expect("head").is_none());

        let head = store.read_object_prefix("a.png", 4).await.expect("ranged read");
        assert_eq!(head.as_ref(), &PNG[..4]);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running S3 endpoint"]
    async fn test_should_copy_set_acl_and_delete() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "sluice-copy").await;
        put(&client, &bucket, "unvalidated/my file.png", PNG).await;
        let store = S3ObjectStore::new(client.clone(), &bucket);

        store
            .copy_object("unvalidated/my file.png", "my file.png")
            .await
            .expect("copy_object");
        store
            .set_object_acl("my file.png", CannedAcl::PublicRead)
            .await
            .expect("set_object_acl");
        store
            .delete_object("unvalidated/my file.png")
            .await
            .expect("delete_object");

        let acl = client
            .get_object_acl()
            .bucket(&bucket)
            .key("my file.png")
            .send()
            .await
            .expect("get_object_acl");
        assert!(
            acl.grants()
                .iter()
                .any(|g| g.permission() == Some(&Permission::Read))
        );
        assert!(store.head_object("unvalidated/my file.png").await.expect("head").is_none());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running S3 endpoint"]
    async fn test_should_validate_and_promote_in_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "sluice-promote").await;
        put(&client, &bucket, "test-unvalidated-uploads/images/hello.png", PNG).await;
        let store = Arc::new(S3ObjectStore::new(client.clone(), &bucket));

        let validators: Vec<Box<dyn Validator>> = vec![
            Box::new(FileSize::at_most(1024)),
            Box::new(MimeType::exact("image/png")),
        ];
        let settings = ValidatorSettings::builder()
            .unvalidated_prefix("test-unvalidated-uploads/")
            .build();
        let mut validator = ObjectValidator::new(
            "test-unvalidated-uploads/images/hello.png",
            store.clone(),
            validators,
            settings,
        )
        .await
        .expect("uploaded object exists");

        assert!(validator.validate().await.expect("store available"));
        assert_eq!(validator.object().key(), "images/hello.png");
        assert!(store.head_object("images/hello.png").await.expect("head").is_some());
        assert!(
            store
                .head_object("test-unvalidated-uploads/images/hello.png")
                .await
                .expect("head")
                .is_none()
        );

        cleanup_bucket(&client, &bucket).await;
    }
}
