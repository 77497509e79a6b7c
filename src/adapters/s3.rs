use crate::domain::ports::ObjectStore;
use crate::utils::error::{AdapterError, Result};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

/// [`ObjectStore`] backed by Amazon S3.
///
/// SDK errors are returned as `AdapterError::Transport` holding the original
/// `SdkError`, so callers can downcast and match on the operation error.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &S3Client {
        &self.client
    }
}

impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<String> {
        let output = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(AdapterError::transport)?;

        tracing::debug!(bucket, key, e_tag = ?output.e_tag(), "S3 put_object completed");
        Ok(format!("s3://{}/{}", bucket, key))
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(AdapterError::transport)?;

        let data = output
            .body
            .collect()
            .await
            .map_err(AdapterError::transport)?
            .into_bytes();

        if data.is_empty() {
            return Ok(None);
        }
        Ok(Some(data.to_vec()))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(AdapterError::transport)?;
        Ok(())
    }
}
