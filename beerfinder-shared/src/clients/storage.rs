use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("delete failed: {0}")]
    Delete(String),
}

/// Object storage for profile photos.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Stores `body` under `key` and returns its public URL.
    async fn upload(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<String, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Object key for a URL previously returned by `upload`, or `None` when the
    /// URL points somewhere this storage does not own.
    fn key_for_url(&self, url: &str) -> Option<String>;
}

/// S3-compatible storage (MinIO in development).
#[derive(Clone)]
pub struct S3PhotoStorage {
    client: S3Client,
    bucket: String,
    public_url: String,
}

impl S3PhotoStorage {
    pub async fn new(
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_url: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "beerfinder");

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = S3Client::from_conf(config);

        // Ensure bucket exists
        if let Err(e) = client.create_bucket().bucket(bucket).send().await {
            tracing::debug!(bucket = %bucket, error = %e, "create_bucket skipped");
        }

        tracing::info!(endpoint = %endpoint, bucket = %bucket, "photo storage initialized");

        Self {
            client,
            bucket: bucket.to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PhotoStorage for S3PhotoStorage {
    async fn upload(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body.into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(public_object_url(&self.public_url, &self.bucket, key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;

        Ok(())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        object_key_from_url(&self.public_url, &self.bucket, url)
    }
}

pub fn public_object_url(public_url: &str, bucket: &str, key: &str) -> String {
    format!("{public_url}/{bucket}/{key}")
}

pub fn object_key_from_url(public_url: &str, bucket: &str, url: &str) -> Option<String> {
    let prefix = format!("{public_url}/{bucket}/");
    url.strip_prefix(&prefix)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}
