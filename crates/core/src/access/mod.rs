//! Time-limited access URLs for catalogued objects.

mod s3;

pub use s3::S3UrlIssuer;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A URL granting temporary read access to one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Errors from URL issuance.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("failed to presign URL: {0}")]
    Presign(String),

    #[error("invalid access configuration: {0}")]
    Configuration(String),
}

/// Trait for minting temporary access URLs.
#[async_trait]
pub trait UrlIssuer: Send + Sync {
    /// Issue a URL for the object stored under `object_key`.
    async fn issue(&self, object_key: &str) -> Result<IssuedUrl, AccessError>;

    /// Name of this issuer (for logs).
    fn name(&self) -> &str;
}
