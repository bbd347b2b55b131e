//! Presigned S3 GET URLs.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use chrono::Utc;
use tracing::debug;

use super::{AccessError, IssuedUrl, UrlIssuer};

/// Issues presigned `GetObject` URLs for one bucket.
#[derive(Clone)]
pub struct S3UrlIssuer {
    client: Client,
    bucket: String,
    expiry_secs: u64,
}

impl S3UrlIssuer {
    pub fn new(client: Client, bucket: impl Into<String>, expiry_secs: u64) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            expiry_secs,
        }
    }
}

#[async_trait]
impl UrlIssuer for S3UrlIssuer {
    async fn issue(&self, object_key: &str) -> Result<IssuedUrl, AccessError> {
        let presigning = PresigningConfig::expires_in(Duration::from_secs(self.expiry_secs))
            .map_err(|e| AccessError::Configuration(e.to_string()))?;

        let issued_at = Utc::now();
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(object_key)
            .presigned(presigning)
            .await
            .map_err(|e| AccessError::Presign(DisplayErrorContext(&e).to_string()))?;

        debug!("Issued presigned URL for s3://{}/{}", self.bucket, object_key);

        Ok(IssuedUrl {
            url: request.uri().to_string(),
            expires_at: issued_at + chrono::Duration::seconds(self.expiry_secs as i64),
        })
    }

    fn name(&self) -> &str {
        "s3"
    }
}
