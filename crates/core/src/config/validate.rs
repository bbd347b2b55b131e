use super::{types::Config, ConfigError};

/// Longest lifetime S3 accepts for a presigned URL (7 days).
const MAX_URL_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.storage.bucket.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.bucket cannot be empty".to_string(),
        ));
    }

    if !(1..=1000).contains(&config.storage.page_size) {
        return Err(ConfigError::ValidationError(
            "storage.page_size must be between 1 and 1000".to_string(),
        ));
    }

    if config.sync.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "sync.batch_size must be at least 1".to_string(),
        ));
    }

    if config.access.url_expiry_secs == 0 || config.access.url_expiry_secs > MAX_URL_EXPIRY_SECS {
        return Err(ConfigError::ValidationError(format!(
            "access.url_expiry_secs must be between 1 and {}",
            MAX_URL_EXPIRY_SECS
        )));
    }

    if config.search.default_limit == 0 || config.search.default_limit > config.search.max_limit {
        return Err(ConfigError::ValidationError(
            "search.default_limit must be between 1 and search.max_limit".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn base_config() -> Config {
        load_config_from_str(
            r#"
[storage]
bucket = "docs"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&base_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = base_config();
        config.server.port = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_empty_bucket_fails() {
        let mut config = base_config();
        config.storage.bucket = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_batch_size_fails() {
        let mut config = base_config();
        config.sync.batch_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_page_size_bounds() {
        let mut config = base_config();
        config.storage.page_size = 0;
        assert!(validate_config(&config).is_err());
        config.storage.page_size = 1001;
        assert!(validate_config(&config).is_err());
        config.storage.page_size = 1000;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_url_expiry_bounds() {
        let mut config = base_config();
        config.access.url_expiry_secs = 0;
        assert!(validate_config(&config).is_err());
        config.access.url_expiry_secs = MAX_URL_EXPIRY_SECS + 1;
        assert!(validate_config(&config).is_err());
        config.access.url_expiry_secs = MAX_URL_EXPIRY_SECS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_search_limits() {
        let mut config = base_config();
        config.search.default_limit = 200;
        assert!(validate_config(&config).is_err());
    }
}
