//! Common test utilities and fixtures.

use async_trait::async_trait;
use leaflet_app::{App, AppServices, IdentityProvider, ProviderError, UploadProvider};
use leaflet_core::{IdGenerator, Ident, Page, Policy};
use leaflet_metadata::SqliteStore;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Identity provider with a fixed answer.
pub struct StaticIdentity {
    pub ident: Option<Ident>,
    pub admin: bool,
}

impl IdentityProvider for StaticIdentity {
    fn current_ident(&self) -> Option<Ident> {
        self.ident.clone()
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn login_url(&self, return_path: &str) -> String {
        format!("/login?return={return_path}")
    }

    fn logout_url(&self, return_path: &str) -> String {
        format!("/logout?return={return_path}")
    }
}

/// Upload provider that records deleted blobs.
#[derive(Default)]
pub struct RecordingUploads {
    pub deleted: Mutex<Vec<String>>,
    pub fail_deletes: bool,
}

#[async_trait]
impl UploadProvider for RecordingUploads {
    fn upload_url(&self, destination: &str, max_bytes: u64) -> Result<String, ProviderError> {
        Ok(format!(
            "http://blobs.test/upload?max={max_bytes}&dest={destination}"
        ))
    }

    fn serving_url(
        &self,
        blob_key: &str,
        secure: bool,
        size: Option<u32>,
    ) -> Result<String, ProviderError> {
        let scheme = if secure { "https" } else { "http" };
        Ok(match size {
            Some(size) => format!("{scheme}://blobs.test/{blob_key}?s={size}"),
            None => format!("{scheme}://blobs.test/{blob_key}"),
        })
    }

    async fn delete_blob(&self, blob_key: &str) -> Result<(), ProviderError> {
        if self.fail_deletes {
            return Err(ProviderError("blob service unavailable".to_string()));
        }
        self.deleted.lock().unwrap().push(blob_key.to_string());
        Ok(())
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

/// Application wired to a throwaway SQLite database.
#[allow(dead_code)]
pub struct TestApp {
    pub services: AppServices,
    pub uploads: Arc<RecordingUploads>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_uploads(RecordingUploads::default()).await
    }

    pub async fn with_uploads(uploads: RecordingUploads) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let store = SqliteStore::new(temp_dir.path().join("test.db"), None)
            .await
            .expect("Failed to open test database");
        let uploads = Arc::new(uploads);
        let services = AppServices::new(Arc::new(store), uploads.clone());
        Self {
            services,
            uploads,
            _temp_dir: temp_dir,
        }
    }

    pub fn with_ids(mut self, ids: &[&str]) -> Self {
        self.services = self
            .services
            .with_id_generator(Arc::new(SequenceIds::new(ids)));
        self
    }

    pub fn anonymous(&self) -> App {
        self.services.app(Arc::new(StaticIdentity {
            ident: None,
            admin: false,
        }))
    }

    /// Caller signed in as `test:{subject}`, registered or not.
    pub fn signed_in(&self, subject: &str) -> App {
        self.services.app(Arc::new(StaticIdentity {
            ident: Some(Ident::new("test", subject)),
            admin: false,
        }))
    }

    pub fn admin(&self) -> App {
        self.services.app(Arc::new(StaticIdentity {
            ident: Some(Ident::new("test", "admin")),
            admin: true,
        }))
    }

    /// Register `name` and return an app acting as that user.
    pub async fn user(&self, name: &str) -> App {
        let app = self.signed_in(name);
        app.create_user(Ident::new("test", name), name)
            .await
            .expect("Failed to create user");
        app
    }

    /// Register `owner` and give them a page.
    pub async fn user_with_page(&self, owner: &str, page_name: &str, policy: Policy) -> App {
        let app = self.user(owner).await;
        let mut page = Page::new(owner, page_name);
        page.policy = policy;
        app.create_page(page).await.expect("Failed to create page");
        app
    }
}
