use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tokio::runtime::Handle;

use super::{ObjectStore, StoreError};

/// [ObjectStore] backed by an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: Option<String>,
    runtime: Handle,
}

impl S3Store {
    /// Create a store writing into `bucket`.
    ///
    /// A missing bucket isn't rejected here, every write fails instead.
    pub fn new(sdk_config: &SdkConfig, bucket: Option<String>, runtime: Handle) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
            bucket,
            runtime,
        }
    }
}

impl ObjectStore for S3Store {
    fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), StoreError> {
        let bucket = self.bucket.as_deref().ok_or(StoreError::MissingBucket)?;
        log::trace!(target: "store::s3", "PutObject s3://{bucket}/{key} ({} bytes)", body.len());

        let request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send();

        self.runtime
            .block_on(request)
            .map_err(|e| StoreError::Write(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
