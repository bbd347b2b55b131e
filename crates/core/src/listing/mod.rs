//! Remote object listing abstraction.
//!
//! A `ListingSource` enumerates every object in a container as a lazy stream
//! of pages, so containers of any size can be walked without holding the
//! full listing in memory.

mod s3;
mod types;

pub use s3::S3ListingSource;
pub use types::*;

/// Trait for paginated enumeration of remote objects.
pub trait ListingSource: Send + Sync {
    /// Stream every object in `container`, one page at a time.
    ///
    /// Pages are yielded in the remote's order and the next page is only
    /// requested when the stream is polled again.
    fn list_all<'a>(&'a self, container: &'a str) -> ListingStream<'a>;

    /// Name of this listing backend (for logs).
    fn name(&self) -> &str;
}
