//! Presigned upload URLs for product files.
//!
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use serde::Deserialize;

/// Uploads land here, where the import lambda picks them up.
pub const UPLOAD_PREFIX: &str = "uploaded/";
pub const URL_EXPIRY: Duration = Duration::from_secs(3600);

/// Request mapped from the `filename` query string parameter.
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub filename: Option<String>,
}

pub fn upload_key(filename: &str) -> Result<String> {
    if filename.trim().is_empty() {
        return Err(anyhow!("A filename is required to sign an upload URL"));
    }
    Ok(format!("{}{}", UPLOAD_PREFIX, filename))
}

#[async_trait]
pub trait UrlSigner {
    /// Signs a PutObject request for `bucket`/`key`, valid for `expires_in`.
    async fn presign_put(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String>;
}

#[async_trait]
impl<T> UrlSigner for &T
where
    T: UrlSigner + Sync + ?Sized,
{
    async fn presign_put(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        (**self).presign_put(bucket, key, expires_in).await
    }
}

pub struct S3UrlSigner {
    client: aws_sdk_s3::Client,
}

impl S3UrlSigner {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        S3UrlSigner { client }
    }
}

#[async_trait]
impl UrlSigner for S3UrlSigner {
    async fn presign_put(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String> {
        let request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(expires_in)?)
            .await?;
        Ok(request.uri().to_string())
    }
}

pub async fn signed_upload_url<S: UrlSigner>(
    signer: &S,
    bucket: &str,
    request: &UploadRequest,
) -> Result<String> {
    let filename = request.filename.as_deref().unwrap_or_default();
    let key = upload_key(filename)?;
    signer.presign_put(bucket, &key, URL_EXPIRY).await
}
