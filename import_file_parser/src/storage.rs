use std::pin::Pin;

use async_trait::async_trait;
use log::error;
use tokio::io::AsyncRead;

use crate::error::BoxError;

pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

/// The object storage operations the import needs.
#[async_trait]
pub trait ObjectStore {
    /// Opens the object for reading. `Ok(None)` means there is no such object.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectBody>, BoxError>;

    async fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<(), BoxError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BoxError>;
}

#[async_trait]
impl<T> ObjectStore for &T
where
    T: ObjectStore + Sync + ?Sized,
{
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectBody>, BoxError> {
        (**self).get_object(bucket, key).await
    }

    async fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<(), BoxError> {
        (**self)
            .copy_object(bucket, source_key, destination_key)
            .await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BoxError> {
        (**self).delete_object(bucket, key).await
    }
}

#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        S3ObjectStore { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectBody>, BoxError> {
        let res = self.client.get_object().bucket(bucket).key(key).send().await;
        match res {
            Ok(obj) => {
                let body: ObjectBody = Box::pin(obj.body.into_async_read());
                Ok(Some(body))
            }
            Err(e) => {
                let se = e.into_service_error();
                if se.is_no_such_key() {
                    Ok(None)
                } else {
                    error!("Error downloading {} from S3: {}", key, se);
                    Err(se.into())
                }
            }
        }
    }

    async fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<(), BoxError> {
        self.client
            .copy_object()
            .bucket(bucket)
            .copy_source(copy_source(bucket, source_key))
            .key(destination_key)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), BoxError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }
}

/// `bucket/key` with each key segment percent-encoded, as CopyObject expects.
pub fn copy_source(bucket: &str, key: &str) -> String {
    let encoded_key = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", bucket, encoded_key)
}
