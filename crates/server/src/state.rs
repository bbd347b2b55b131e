use std::sync::Arc;

use objdex_core::{Config, ObjectCatalog, SanitizedConfig, SyncScheduler, UrlIssuer};

/// Shared application state
pub struct AppState {
    config: Config,
    catalog: Arc<dyn ObjectCatalog>,
    url_issuer: Arc<dyn UrlIssuer>,
    scheduler: Arc<SyncScheduler>,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<dyn ObjectCatalog>,
        url_issuer: Arc<dyn UrlIssuer>,
        scheduler: Arc<SyncScheduler>,
    ) -> Self {
        Self {
            config,
            catalog,
            url_issuer,
            scheduler,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn catalog(&self) -> &dyn ObjectCatalog {
        self.catalog.as_ref()
    }

    pub fn url_issuer(&self) -> &dyn UrlIssuer {
        self.url_issuer.as_ref()
    }

    pub fn scheduler(&self) -> &SyncScheduler {
        self.scheduler.as_ref()
    }
}
