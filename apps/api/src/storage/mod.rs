//! Resume object storage.
//!
//! `AppState` carries an `Arc<dyn ResumeStore>`: `S3ResumeStore` in normal
//! operation, `StubResumeStore` when `TEST_MODE` is on.

use std::future::Future;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

const ALLOWED_EXTENSIONS: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
];

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Stores the object and returns the URL recorded on the submission.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, AppError>;

    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

pub struct S3ResumeStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: Option<String>,
}

impl S3ResumeStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, endpoint: Option<String>) -> Self {
        Self {
            client,
            bucket,
            endpoint,
        }
    }

    fn object_url(&self, key: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, key),
        }
    }
}

#[async_trait]
impl ResumeStore for S3ResumeStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded resume to s3://{}/{}", self.bucket, key);
        Ok(self.object_url(key))
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;

        info!("Removed s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

/// Records a deterministic URL without touching any network.
pub struct StubResumeStore;

#[async_trait]
impl ResumeStore for StubResumeStore {
    async fn put(&self, key: &str, _body: Bytes, _content_type: &str) -> Result<String, AppError> {
        info!("Test mode: skipping resume upload for {key}");
        Ok(format!("https://test-bucket.s3.amazonaws.com/{key}"))
    }

    async fn remove(&self, _key: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Uploads a resume and hands its URL to `record`. When recording fails the
/// object is removed again so the bucket holds no resume without a submission.
pub async fn store_and_record<T, F, Fut>(
    store: &dyn ResumeStore,
    key: &str,
    body: Bytes,
    content_type: &str,
    record: F,
) -> Result<T, AppError>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let url = store.put(key, body, content_type).await?;
    match record(url).await {
        Ok(value) => Ok(value),
        Err(err) => {
            if let Err(cleanup) = store.remove(key).await {
                warn!("Resume {key} is orphaned after a failed submission: {cleanup}");
            }
            Err(err)
        }
    }
}

/// Returns the normalised extension and its content type, or a validation error.
pub fn resume_content_type(file_name: &str) -> Result<(&'static str, &'static str), AppError> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    ALLOWED_EXTENSIONS
        .iter()
        .find(|(allowed, _)| *allowed == ext)
        .map(|(allowed, content_type)| (*allowed, *content_type))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Resume must be a .pdf, .doc or .docx file, got '{file_name}'"
            ))
        })
}

/// Object key for a resume. Candidate-supplied names never reach the key.
pub fn resume_key(job_id: &str, ext: &str) -> String {
    let safe_job: String = job_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("resumes/{safe_job}/{}.{ext}", Uuid::new_v4())
}
