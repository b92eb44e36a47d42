//! Browser-style POST uploads with signed policies against a live endpoint.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sluice_auth::{SignedUploadPolicy, UploadOptions};
    use sluice_core::{ObjectStore, S3ObjectStore, SignatureVersion, SluiceConfig};
    use sluice_validation::{MimeType, ObjectValidator, Validator, ValidatorSettings};

    use crate::{cleanup_bucket, create_test_bucket, post_upload, s3_client, storage_credentials};

    const JPEG: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01,
    ];

    fn config(version: SignatureVersion) -> SluiceConfig {
        SluiceConfig::builder()
            .unvalidated_prefix("unvalidated-uploads/")
            .expires_in(300)
            .signature_version(version)
            .build()
    }

    async fn upload_and_promote(version: SignatureVersion, prefix: &str) {
        let client = s3_client();
        let bucket = create_test_bucket(&client, prefix).await;
        let config = config(version);

        let policy = SignedUploadPolicy::new(
            "images/hello.jpg",
            "image/jpeg",
            &storage_credentials(&bucket),
            &config,
            UploadOptions::default(),
        )
        .expect("complete credentials");

        let response = post_upload(
            &bucket,
            &policy.form_fields(),
            policy.mime_type(),
            "hello.jpg",
            JPEG.to_vec(),
        )
        .await
        .expect("POST upload");
        assert_eq!(response.status().as_u16(), 201);

        let store = Arc::new(S3ObjectStore::new(client.clone(), &bucket));
        let validators: Vec<Box<dyn Validator>> = vec![Box::new(MimeType::exact("image/jpeg"))];
        let mut validator = ObjectValidator::new(
            policy.key(),
            store.clone(),
            validators,
            ValidatorSettings::from(&config),
        )
        .await
        .expect("uploaded object exists");

        assert!(validator.validate().await.expect("store available"));
        assert!(store.head_object("images/hello.jpg").await.expect("head").is_some());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running S3 endpoint"]
    async fn test_should_accept_sigv4_signed_post() {
        upload_and_promote(SignatureVersion::V4, "sluice-post-v4").await;
    }

    #[tokio::test]
    #[ignore = "requires running S3 endpoint"]
    async fn test_should_accept_sigv2_signed_post() {
        upload_and_promote(SignatureVersion::V2, "sluice-post-v2").await;
    }

    #[tokio::test]
    #[ignore = "requires running S3 endpoint"]
    async fn test_should_reject_upload_over_size_limit() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "sluice-post-big").await;
        let options = UploadOptions::builder().max_content_length(4).build();

        let policy = SignedUploadPolicy::new(
            "big.jpg",
            "image/jpeg",
            &storage_credentials(&bucket),
            &config(SignatureVersion::V4),
            options,
        )
        .expect("complete credentials");

        let response = post_upload(
            &bucket,
            &policy.form_fields(),
            policy.mime_type(),
            "big.jpg",
            JPEG.to_vec(),
        )
        .await
        .expect("POST upload");
        assert!(response.status().is_client_error());

        cleanup_bucket(&client, &bucket).await;
    }
}
