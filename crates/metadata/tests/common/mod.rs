//! Common test utilities and fixtures.

use leaflet_core::IdGenerator;
use leaflet_metadata::{Datastore, MetadataResult, SqliteStore};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A test datastore wrapper that cleans up on drop.
#[allow(dead_code)]
pub struct TestMetadata {
    pub store: Arc<dyn Datastore>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestMetadata {
    /// Create a new SQLite datastore in a temporary directory.
    pub async fn new() -> MetadataResult<Self> {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let store = SqliteStore::new(&db_path, None).await?;

        Ok(Self {
            store: Arc::new(store),
            _temp_dir: temp_dir,
        })
    }

    pub fn store(&self) -> Arc<dyn Datastore> {
        self.store.clone()
    }
}

/// Id generator that hands out a fixed sequence, then repeats the last id.
#[allow(dead_code)]
pub struct SequenceIds {
    ids: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

#[allow(dead_code)]
impl SequenceIds {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            ids: Mutex::new(ids.iter().map(|s| s.to_string()).collect()),
            last: Mutex::new(String::new()),
        }
    }
}

impl IdGenerator for SequenceIds {
    fn generate(&self) -> String {
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.ids.lock().unwrap().pop_front() {
            *last = next;
        }
        last.clone()
    }
}
