//! Integration tests for Sluice.
//!
//! The in-memory flows run with a plain `cargo test`. Tests against a live
//! S3-compatible endpoint (`localhost:4566` by default, override with
//! `S3_ENDPOINT_URL`) are marked `#[ignore]`. Run them with:
//!
//! ```text
//! cargo test -p sluice-integration -- --ignored
//! ```

use std::collections::BTreeMap;
use std::sync::Once;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use sluice_core::StorageCredentials;

/// Access key and secret accepted by the local endpoint.
pub const TEST_ACCESS_KEY: &str = "test";

static TRACING: Once = Once::new();

/// Route `RUST_LOG`-filtered output through the test harness.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

fn endpoint_url() -> String {
    std::env::var("S3_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Path-style client for the local endpoint, signed with [`TEST_ACCESS_KEY`].
#[must_use]
pub fn s3_client() -> aws_sdk_s3::Client {
    init_tracing();
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new(
            TEST_ACCESS_KEY,
            TEST_ACCESS_KEY,
            None,
            None,
            "sluice-integration",
        ))
        .endpoint_url(endpoint_url())
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(config)
}

/// Upload credentials matching [`s3_client`] for `bucket`.
#[must_use]
pub fn storage_credentials(bucket: &str) -> StorageCredentials {
    StorageCredentials::new(TEST_ACCESS_KEY, TEST_ACCESS_KEY, bucket)
}

/// Create a uniquely named bucket starting with `prefix`.
pub async fn create_test_bucket(client: &aws_sdk_s3::Client, prefix: &str) -> String {
    let bucket = format!("{prefix}-{}", uuid::Uuid::new_v4().simple());
    if let Err(err) = client.create_bucket().bucket(&bucket).send().await {
        panic!("create_bucket {bucket}: {err}");
    }
    bucket
}

/// Best-effort removal of `bucket` and everything in it.
pub async fn cleanup_bucket(client: &aws_sdk_s3::Client, bucket: &str) {
    let mut pages = client
        .list_objects_v2()
        .bucket(bucket)
        .into_paginator()
        .send();
    while let Some(Ok(page)) = pages.next().await {
        for key in page.contents().iter().filter_map(|object| object.key()) {
            let _ = client.delete_object().bucket(bucket).key(key).send().await;
        }
    }
    let _ = client.delete_bucket().bucket(bucket).send().await;
}

/// POST `body` to `bucket` as a browser form built from signed `fields`.
///
/// The file part must come last, after every policy field.
pub async fn post_upload(
    bucket: &str,
    fields: &BTreeMap<String, String>,
    content_type: &str,
    file_name: &str,
    body: Vec<u8>,
) -> anyhow::Result<reqwest::Response> {
    let mut form = reqwest::multipart::Form::new();
    for (name, value) in fields {
        form = form.text(name.clone(), value.clone());
    }
    form = form.text("Content-Type", content_type.to_owned());
    form = form.part(
        "file",
        reqwest::multipart::Part::bytes(body)
            .file_name(file_name.to_owned())
            .mime_str(content_type)?,
    );

    let response = reqwest::Client::new()
        .post(format!("{}/{bucket}", endpoint_url()))
        .multipart(form)
        .send()
        .await?;
    Ok(response)
}

mod test_post_upload;
mod test_s3_store;
mod test_upload_flow;
