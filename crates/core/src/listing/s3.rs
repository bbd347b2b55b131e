//! S3 listing source using `ListObjectsV2` with continuation tokens.

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Error;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::debug;

use super::{ListedObject, ListingError, ListingPage, ListingSource, ListingStream};

/// Default number of keys requested per page (the S3 maximum).
const DEFAULT_PAGE_SIZE: i32 = 1000;

/// Where the pager is in the listing.
enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Lists objects of an S3 bucket page by page.
#[derive(Clone)]
pub struct S3ListingSource {
    client: Client,
    prefix: Option<String>,
    page_size: i32,
}

impl S3ListingSource {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            prefix: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Only list keys under `prefix`.
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix.filter(|p| !p.is_empty());
        self
    }

    /// Keys requested per page (clamped to 1..=1000).
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }
}

impl ListingSource for S3ListingSource {
    fn list_all<'a>(&'a self, container: &'a str) -> ListingStream<'a> {
        let client = self.client.clone();
        let bucket = container.to_string();
        let prefix = self.prefix.clone();
        let page_size = self.page_size;

        stream::try_unfold(Cursor::Start, move |cursor| {
            let client = client.clone();
            let bucket = bucket.clone();
            let prefix = prefix.clone();

            async move {
                let token = match cursor {
                    Cursor::Done => return Ok(None),
                    Cursor::Start => None,
                    Cursor::Next(token) => Some(token),
                };

                let resp = client
                    .list_objects_v2()
                    .bucket(&bucket)
                    .set_prefix(prefix)
                    .max_keys(page_size)
                    .set_continuation_token(token)
                    .send()
                    .await
                    .map_err(|e| classify_list_error(&bucket, e))?;

                let entries: Vec<ListedObject> = resp
                    .contents()
                    .iter()
                    .filter_map(|object| {
                        object.key().map(|key| ListedObject {
                            key: key.to_string(),
                            last_modified: object.last_modified().and_then(|ts| {
                                DateTime::<Utc>::from_timestamp(ts.secs(), ts.subsec_nanos())
                            }),
                        })
                    })
                    .collect();

                debug!("Listed {} objects from s3://{}", entries.len(), bucket);

                let next = match resp.next_continuation_token() {
                    Some(token) if !token.is_empty() => Cursor::Next(token.to_string()),
                    _ => Cursor::Done,
                };

                Ok(Some((ListingPage { entries }, next)))
            }
        })
        .boxed()
    }

    fn name(&self) -> &str {
        "s3"
    }
}

/// Map an SDK failure onto the listing error taxonomy.
fn classify_list_error(bucket: &str, err: SdkError<ListObjectsV2Error>) -> ListingError {
    let message = DisplayErrorContext(&err).to_string();

    if matches!(err, SdkError::DispatchFailure(_) | SdkError::TimeoutError(_)) {
        return ListingError::Network(message);
    }

    match err.code() {
        Some("NoSuchBucket") => ListingError::NotFound(bucket.to_string()),
        Some(
            "AccessDenied"
            | "InvalidAccessKeyId"
            | "SignatureDoesNotMatch"
            | "ExpiredToken"
            | "InvalidToken",
        ) => ListingError::Unauthorized(message),
        _ => ListingError::Provider(message),
    }
}
