use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use tokio::sync::Mutex;

use crate::types::CacheError;

/// A durable slot holding one serialized snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Reads the stored snapshot bytes.
    async fn load(&self) -> Result<Vec<u8>, CacheError>;

    /// Replaces the stored snapshot as a whole.
    async fn save(&self, data: Vec<u8>) -> Result<(), CacheError>;
}

/// Snapshot store backed by a single S3 object.
#[derive(Debug, Clone)]
pub struct S3SnapshotStore {
    client: S3Client,
    bucket: String,
    key: String,
}

impl S3SnapshotStore {
    /// Creates a store for `bucket/key` using an already loaded AWS config.
    pub fn new(config: &SdkConfig, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client: S3Client::new(config),
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl SnapshotStore for S3SnapshotStore {
    async fn load(&self) -> Result<Vec<u8>, CacheError> {
        log::info!("📥 Downloading cached snapshot s3://{}/{}", self.bucket, self.key);

        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                if let Some(service_error) = e.as_service_error() {
                    if service_error.is_no_such_key() {
                        return Err(CacheError::NotFound {
                            bucket: self.bucket.clone(),
                            key: self.key.clone(),
                        });
                    }
                    log::error!("❌ AWS S3 service error: {:?}", service_error);
                    return Err(CacheError::Backend(format!(
                        "AWS S3 service error: {:?}",
                        service_error
                    )));
                }
                log::error!("❌ AWS S3 error: {:#?}", e);
                return Err(CacheError::Backend(format!("AWS S3 error: {}", e)));
            }
        };

        let data = output.body.collect().await.map_err(|e| {
            CacheError::Backend(format!("Failed to read snapshot body: {}", e))
        })?;

        let bytes = data.into_bytes().to_vec();
        log::info!("📥 Downloaded {} bytes of cached snapshot", bytes.len());

        Ok(bytes)
    }

    async fn save(&self, data: Vec<u8>) -> Result<(), CacheError> {
        log::info!(
            "📤 Uploading {} bytes to s3://{}/{}",
            data.len(),
            self.bucket,
            self.key
        );

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .content_type("application/json")
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                log::error!("❌ AWS S3 upload error: {:#?}", e);
                let message = if let Some(service_error) = e.as_service_error() {
                    format!("AWS S3 service error: {:?}", service_error)
                } else {
                    format!("AWS S3 error: {}", e)
                };
                CacheError::Backend(message)
            })?;

        log::info!("✅ Snapshot cache updated");
        Ok(())
    }
}

/// Snapshot store that keeps the blob in memory.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    data: Mutex<Option<Vec<u8>>>,
}

impl MemorySnapshotStore {
    /// Creates an empty store; the first `load` reports `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `data`.
    pub fn with_contents(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Mutex::new(Some(data.into())),
        }
    }

    /// Current contents, if anything was stored.
    pub async fn contents(&self) -> Option<Vec<u8>> {
        self.data.lock().await.clone()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> Result<Vec<u8>, CacheError> {
        self.data
            .lock()
            .await
            .clone()
            .ok_or_else(|| CacheError::NotFound {
                bucket: "memory".to_string(),
                key: "snapshot".to_string(),
            })
    }

    async fn save(&self, data: Vec<u8>) -> Result<(), CacheError> {
        *self.data.lock().await = Some(data);
        Ok(())
    }
}
