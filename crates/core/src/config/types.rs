use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::sync::SyncConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("objdex.db")
}

/// Remote object store (S3) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Bucket to index.
    pub bucket: String,
    /// AWS region (default: resolved by the AWS SDK)
    #[serde(default)]
    pub region: Option<String>,
    /// Named AWS profile (default: the standard credentials chain)
    #[serde(default)]
    pub profile: Option<String>,
    /// Custom endpoint for S3-compatible stores (MinIO, R2, ...)
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Use path-style addressing (needed by most S3-compatible stores)
    #[serde(default)]
    pub force_path_style: bool,
    /// Only index keys under this prefix
    #[serde(default)]
    pub prefix: Option<String>,
    /// Keys requested per listing page (default: 1000)
    #[serde(default = "default_page_size")]
    pub page_size: i32,
}

fn default_page_size() -> i32 {
    1000
}

/// Access URL configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessConfig {
    /// Lifetime of issued URLs in seconds (default: 600)
    #[serde(default = "default_url_expiry")]
    pub url_expiry_secs: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            url_expiry_secs: default_url_expiry(),
        }
    }
}

fn default_url_expiry() -> u64 {
    600
}

/// Search API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_search_limit")]
    pub max_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_search_limit(),
            max_limit: default_max_search_limit(),
        }
    }
}

fn default_search_limit() -> u32 {
    20
}

fn default_max_search_limit() -> u32 {
    100
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: SanitizedStorageConfig,
    pub sync: SyncConfig,
    pub access: AccessConfig,
    pub search: SearchConfig,
}

/// Sanitized storage config (profile name hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStorageConfig {
    pub bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub profile_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            storage: SanitizedStorageConfig {
                bucket: config.storage.bucket.clone(),
                region: config.storage.region.clone(),
                endpoint_url: config.storage.endpoint_url.clone(),
                prefix: config.storage.prefix.clone(),
                profile_configured: config
                    .storage
                    .profile
                    .as_deref()
                    .is_some_and(|p| !p.is_empty()),
            },
            sync: config.sync.clone(),
            access: config.access.clone(),
            search: config.search.clone(),
        }
    }
}
