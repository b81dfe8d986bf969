//! Repository and transaction layer for Leaflet.
//!
//! This crate provides the persistence model:
//! - Per-entity repository traits with hierarchical keys
//! - A transaction primitive that commits or rolls back a closure's writes
//! - A backend-neutral page query builder with has-more detection
//! - The SQLite datastore

pub mod error;
pub mod models;
pub mod query;
pub mod repos;
pub mod store;
pub mod transaction;

pub use error::{MetadataError, MetadataResult};
pub use query::{PageFilter, PageOrderField, PageQuery, PageSet, SortDirection};
pub use repos::Repository;
pub use store::{Datastore, SqliteStore, SqliteTransaction, Transaction};
pub use transaction::run_in_transaction;

use leaflet_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a datastore from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn Datastore>> {
    match config {
        MetadataConfig::Sqlite {
            path,
            query_timeout_secs,
        } => {
            let store = SqliteStore::new(path, *query_timeout_secs).await?;
            Ok(Arc::new(store) as Arc<dyn Datastore>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leaflet_core::config::MetadataConfig;

    #[tokio::test]
    async fn test_from_config_sqlite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("leaflet.db");
        let config = MetadataConfig::Sqlite {
            path: db_path.clone(),
            query_timeout_secs: None,
        };

        let store = from_config(&config).await.unwrap();
        store.health_check().await.unwrap();
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(temp_dir.path().join("leaflet.db"), None)
            .await
            .unwrap();
        store.migrate().await.unwrap();
        store.migrate().await.unwrap();
    }
}
