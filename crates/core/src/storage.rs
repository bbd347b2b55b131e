//! S3 client construction shared by the listing source and the URL issuer.

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client;
use tracing::info;

use crate::config::StorageConfig;

/// Build an S3 client from the storage configuration.
///
/// Credentials come from the default AWS chain, or from the named profile
/// when one is configured.
pub async fn connect_s3(config: &StorageConfig) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = config.region.as_deref().filter(|r| !r.is_empty()) {
        loader = loader.region(Region::new(region.to_string()));
    }
    match config.profile.as_deref().filter(|p| !p.is_empty()) {
        Some(profile) => {
            info!("Using AWS profile: {}", profile);
            loader = loader.profile_name(profile);
        }
        None => info!("Using default AWS credentials chain"),
    }
    if let Some(endpoint) = config.endpoint_url.as_deref().filter(|e| !e.is_empty()) {
        info!("Using custom S3 endpoint: {}", endpoint);
        loader = loader.endpoint_url(endpoint);
    }

    let shared = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(config.force_path_style)
        .build();

    Client::from_conf(s3_config)
}
