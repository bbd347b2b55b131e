pub mod access;
pub mod catalog;
pub mod config;
pub mod listing;
pub mod metrics;
pub mod storage;
pub mod sync;
pub mod testing;

pub use access::{AccessError, IssuedUrl, S3UrlIssuer, UrlIssuer};
pub use catalog::{
    CatalogEntry, CatalogEntrySummary, CatalogError, CatalogStats, NewCatalogEntry, ObjectCatalog,
    SqliteCatalog,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use listing::{ListedObject, ListingError, ListingPage, ListingSource, S3ListingSource};
pub use storage::connect_s3;
pub use sync::{
    SchedulerStatus, SyncConfig, SyncEngine, SyncError, SyncProgress, SyncProgressCallback,
    SyncReport, SyncScheduler,
};
