//! Application state shared across handlers.

use crate::auth::Caller;
use leaflet_app::{App, AppServices, UploadProvider};
use leaflet_core::config::AppConfig;
use leaflet_metadata::Datastore;
use std::sync::Arc;

/// Upper bound for the `limit` query parameter of list endpoints.
pub const MAX_LIST_LIMIT: u32 = 1000;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Collaborators every request's [`App`] is built from.
    pub services: AppServices,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Datastore>,
        uploads: Arc<dyn UploadProvider>,
    ) -> Self {
        let services = AppServices::new(store, uploads)
            .with_max_upload_bytes(config.server.max_upload_bytes);
        Self {
            config: Arc::new(config),
            services,
        }
    }

    /// The use-case facade for one request's caller.
    pub fn app(&self, caller: &Caller) -> App {
        self.services.app(Arc::clone(&caller.0))
    }

    /// Effective list limit: the configured default when unset, capped at
    /// [`MAX_LIST_LIMIT`].
    pub fn list_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.config.server.default_list_limit)
            .clamp(1, MAX_LIST_LIMIT)
    }
}
