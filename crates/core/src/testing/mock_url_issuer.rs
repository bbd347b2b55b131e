//! Mock access URL issuer for testing.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::access::{AccessError, IssuedUrl, UrlIssuer};

/// Mock implementation of the UrlIssuer trait.
///
/// Returns deterministic `https://objects.test/<key>` URLs, records every
/// requested key, and can be told to fail the next request.
#[derive(Debug)]
pub struct MockUrlIssuer {
    expiry_secs: i64,
    issued: Mutex<Vec<String>>,
    next_error: Mutex<Option<String>>,
}

impl Default for MockUrlIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUrlIssuer {
    /// Create a mock issuing URLs valid for 600 seconds.
    pub fn new() -> Self {
        Self {
            expiry_secs: 600,
            issued: Mutex::new(Vec::new()),
            next_error: Mutex::new(None),
        }
    }

    /// Configure the next request to fail with a presign error.
    pub fn set_next_error(&self, message: &str) {
        *self.next_error.lock().unwrap() = Some(message.to_string());
    }

    /// Keys URLs were issued for.
    pub fn issued_keys(&self) -> Vec<String> {
        self.issued.lock().unwrap().clone()
    }
}

#[async_trait]
impl UrlIssuer for MockUrlIssuer {
    async fn issue(&self, object_key: &str) -> Result<IssuedUrl, AccessError> {
        if let Some(msg) = self.next_error.lock().unwrap().take() {
            return Err(AccessError::Presign(msg));
        }

        self.issued.lock().unwrap().push(object_key.to_string());

        Ok(IssuedUrl {
            url: format!("https://objects.test/{}", object_key),
            expires_at: Utc::now() + chrono::Duration::seconds(self.expiry_secs),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
