//! Media storage layer (S3-compatible).
//!
//! Uploaded relay/broadcast media is temporary: callers delete it again once
//! the send completes. Profile and sponsorship images stay.

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use aws_types::region::Region;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Settings;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage configuration error: {0}")]
    Config(String),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Delete failed: {0}")]
    Delete(String),
}

/// Handle to an uploaded object: the public URL used for sending and the
/// object id used for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub url: String,
    pub id: String,
}

/// Opaque upload/delete service in front of the cloud provider.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store raw bytes under the given folder and return its handle.
    async fn upload(&self, bytes: Vec<u8>, folder: &str) -> Result<UploadedMedia, StorageError>;

    /// Remove a previously uploaded object by id.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;
}

/// S3-compatible implementation.
pub struct S3MediaStorage {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3MediaStorage {
    /// Create a new media storage instance
    ///
    /// # Errors
    ///
    /// Returns an error if storage configuration is missing.
    pub async fn new(settings: &Settings) -> Result<Self, StorageError> {
        let endpoint_url = settings
            .s3_endpoint_url
            .as_ref()
            .ok_or_else(|| StorageError::Config("S3_ENDPOINT_URL is missing".into()))?;
        let access_key = settings
            .s3_access_key_id
            .as_ref()
            .ok_or_else(|| StorageError::Config("S3_ACCESS_KEY_ID is missing".into()))?;
        let secret_key = settings
            .s3_secret_access_key
            .as_ref()
            .ok_or_else(|| StorageError::Config("S3_SECRET_ACCESS_KEY is missing".into()))?;
        let bucket = settings
            .s3_bucket_name
            .as_ref()
            .ok_or_else(|| StorageError::Config("S3_BUCKET_NAME is missing".into()))?;
        let public_base_url = settings
            .s3_public_base_url
            .as_ref()
            .ok_or_else(|| StorageError::Config("S3_PUBLIC_BASE_URL is missing".into()))?;

        let credentials = Credentials::new(access_key, secret_key, None, None, "media-storage");

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new("auto"))
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .endpoint_url(endpoint_url)
            .force_path_style(true)
            .build();

        let client = Client::from_conf(s3_config);

        Ok(Self {
            client,
            bucket: bucket.clone(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Check connection to the storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if listing buckets fails.
    pub async fn check_connection(&self) -> Result<(), String> {
        match self.client.list_buckets().send().await {
            Ok(_) => {
                info!("Successfully connected to media storage.");
                Ok(())
            }
            Err(e) => {
                let err_msg = format!("Media storage connectivity test failed: {e:#?}");
                error!("{}", err_msg);
                Err(err_msg)
            }
        }
    }
}

#[async_trait]
impl MediaStore for S3MediaStorage {
    async fn upload(&self, bytes: Vec<u8>, folder: &str) -> Result<UploadedMedia, StorageError> {
        let key = format!("{folder}/{}", Uuid::new_v4());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(UploadedMedia {
            url: format!("{}/{key}", self.public_base_url),
            id: key,
        })
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(id)
            .send()
            .await
            .map_err(|e| StorageError::Delete(e.to_string()))?;

        Ok(())
    }
}
