use crate::core::ObjectStore;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;

pub async fn s3_client(region: &str) -> S3Client {
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let config = aws_sdk_s3::config::Builder::from(&config)
        .region(Region::new(region.to_string()))
        .force_path_style(true)
        .build();
    S3Client::from_conf(config)
}

#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(&self, key: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| EtlError::StorageError {
                message: format!("Failed to upload {} to {}: {}", key, self.bucket, e),
            })?;

        tracing::debug!("Uploaded {} bytes to s3://{}/{}", data.len(), self.bucket, key);
        Ok(())
    }
}
