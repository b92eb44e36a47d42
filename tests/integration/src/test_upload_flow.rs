//! Sign, upload, validate and promote against the in-memory store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use sluice_auth::{SignedUploadPolicy, UploadOptions};
    use sluice_core::{
        CannedAcl, InMemoryObjectStore, SignatureVersion, SluiceConfig, StorageCredentials,
    };
    use sluice_validation::{
        DenyMimeType, FileSize, MimeType, ObjectValidator, ObjectValidatorError,
        ValidationError, Validator, ValidatorSettings, validator_fn,
    };

    use crate::init_tracing;

    const JPEG: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01,
    ];

    fn config() -> SluiceConfig {
        SluiceConfig::builder()
            .unvalidated_prefix("unvalidated-uploads/")
            .max_content_length(1024)
            .build()
    }

    fn credentials() -> StorageCredentials {
        StorageCredentials::new("AKIDEXAMPLE", "secret", "uploads")
    }

    fn image_validators(config: &SluiceConfig) -> Vec<Box<dyn Validator>> {
        vec![
            Box::new(
                FileSize::new(Some(1), Some(config.max_content_length)).expect("valid bounds"),
            ),
            Box::new(MimeType::any_of(["image/jpeg", "image/png"])),
            Box::new(DenyMimeType::exact("image/svg+xml")),
        ]
    }

    /// Stand-in for the browser POST: store the body under the signed key.
    fn upload(store: &InMemoryObjectStore, policy: &SignedUploadPolicy, body: &'static [u8]) {
        let fields = policy.form_fields();
        store.put_object(&fields["key"], Bytes::from_static(body), Some(policy.mime_type()));
    }

    #[tokio::test]
    async fn test_should_promote_valid_upload() {
        init_tracing();
        let config = config();
        let store = Arc::new(InMemoryObjectStore::new("uploads"));

        let policy = SignedUploadPolicy::new(
            "images/hello.jpg",
            "image/jpeg",
            &credentials(),
            &config,
            UploadOptions::default(),
        )
        .expect("complete credentials");
        assert_eq!(policy.key(), "unvalidated-uploads/images/hello.jpg");
        upload(&store, &policy, JPEG);

        let mut validator = ObjectValidator::new(
            policy.key(),
            store.clone(),
            image_validators(&config),
            ValidatorSettings::from(&config),
        )
        .await
        .expect("uploaded object exists");

        assert!(validator.validate().await.expect("store available"));
        assert_eq!(validator.object().key(), "images/hello.jpg");
        assert_eq!(store.keys(), vec!["images/hello.jpg".to_owned()]);
        assert_eq!(
            store.object_acl("images/hello.jpg"),
            Some(CannedAcl::PublicRead)
        );
    }

    #[tokio::test]
    async fn test_should_keep_invalid_upload_under_prefix() {
        init_tracing();
        let config = config();
        let store = Arc::new(InMemoryObjectStore::new("uploads"));

        let policy = SignedUploadPolicy::new(
            "images/not-an-image.jpg",
            "image/jpeg",
            &credentials(),
            &config,
            UploadOptions::default(),
        )
        .expect("complete credentials");
        upload(&store, &policy, b"just some text pretending to be a JPEG");

        let mut validator = ObjectValidator::new(
            policy.key(),
            store.clone(),
            image_validators(&config),
            ValidatorSettings::from(&config),
        )
        .await
        .expect("uploaded object exists");

        assert!(!validator.validate().await.expect("store available"));
        assert_eq!(
            validator.errors(),
            &["File MIME type is text/plain, not in [image/jpeg, image/png].".to_owned()]
        );
        assert_eq!(
            store.keys(),
            vec!["unvalidated-uploads/images/not-an-image.jpg".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_should_promote_randomized_key_to_unique_location() {
        init_tracing();
        let config = config();
        let store = Arc::new(InMemoryObjectStore::new("uploads"));

        let options = UploadOptions::builder()
            .randomize(true)
            .signature_version(SignatureVersion::V2)
            .build();
        let policy =
            SignedUploadPolicy::new("hello.jpg", "image/jpeg", &credentials(), &config, options)
                .expect("complete credentials");
        upload(&store, &policy, JPEG);

        let settings = ValidatorSettings::builder()
            .unvalidated_prefix(config.unvalidated_prefix.clone())
            .new_file_prefix("public/")
            .new_file_acl(CannedAcl::Private)
            .build();
        let mut validator = ObjectValidator::new(policy.key(), store.clone(), vec![], settings)
            .await
            .expect("uploaded object exists");

        assert!(validator.validate().await.expect("store available"));
        let promoted = validator.object().key().to_owned();
        let rest = promoted.strip_prefix("public/").expect("new prefix applied");
        let (id, name) = rest.split_once('/').expect("random segment kept");
        assert_eq!(name, "hello.jpg");
        assert!(uuid::Uuid::parse_str(id).is_ok());
        assert_eq!(store.object_acl(&promoted), Some(CannedAcl::Private));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_should_report_missing_upload() {
        init_tracing();
        let store = Arc::new(InMemoryObjectStore::new("uploads"));
        let err = ObjectValidator::new(
            "unvalidated-uploads/never-uploaded.png",
            store,
            vec![],
            ValidatorSettings::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ObjectValidatorError::FileNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "File unvalidated-uploads/never-uploaded.png was not found."
        );
    }

    #[tokio::test]
    async fn test_should_run_custom_validator_alongside_builtin_rules() {
        init_tracing();
        let config = config();
        let store = Arc::new(InMemoryObjectStore::new("uploads"));
        store.put_object(
            "unvalidated-uploads/avatars/me.jpg",
            Bytes::from_static(JPEG),
            None,
        );

        let mut validators = image_validators(&config);
        validators.push(Box::new(validator_fn("avatars_only", |object| {
            if object.key().contains("/avatars/") {
                Ok(())
            } else {
                Err(ValidationError::invalid("Only avatars may be uploaded here."))
            }
        })));

        let mut validator = ObjectValidator::new(
            "unvalidated-uploads/avatars/me.jpg",
            store.clone(),
            validators,
            ValidatorSettings::from(&config),
        )
        .await
        .expect("uploaded object exists");

        assert!(validator.validate().await.expect("store available"));
        assert!(store.contains("avatars/me.jpg"));
    }

    #[test]
    fn test_should_reject_signing_with_incomplete_credentials() {
        let credentials = StorageCredentials {
            access_key: String::new(),
            bucket_name: String::new(),
            ..credentials()
        };
        let err = SignedUploadPolicy::new(
            "a.png",
            "image/png",
            &credentials,
            &config(),
            UploadOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Storage credentials missing attributes for AWS. \
             Missing attributes: access_key, bucket_name."
        );
    }
}
