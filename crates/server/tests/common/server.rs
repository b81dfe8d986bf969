//! Server test utilities.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use leaflet_app::{ProviderError, UploadProvider};
use leaflet_core::config::{AppConfig, MetadataConfig};
use leaflet_metadata::{Datastore, SqliteStore};
use leaflet_server::{AppState, create_router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

/// Blob service stand-in that records deletions.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeBlobService {
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl UploadProvider for FakeBlobService {
    fn upload_url(&self, destination: &str, max_bytes: u64) -> Result<String, ProviderError> {
        Ok(format!(
            "http://blobs.test/upload?success_path={destination}&max_bytes={max_bytes}"
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
            Some(size) => format!("{scheme}://blobs.test/blobs/{blob_key}?s={size}"),
            None => format!("{scheme}://blobs.test/blobs/{blob_key}"),
        })
    }

    async fn delete_blob(&self, blob_key: &str) -> Result<(), ProviderError> {
        self.deleted.lock().unwrap().push(blob_key.to_string());
        Ok(())
    }
}

/// A caller as seen by the identity middleware.
#[allow(dead_code)]
#[derive(Clone, Copy, Debug)]
pub enum As<'a> {
    Anonymous,
    /// Signed in through the `test` provider with this subject.
    Subject(&'a str),
}

/// A test server wrapper with all dependencies.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub blobs: Arc<FakeBlobService>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with a temporary database.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("leaflet.db");

        let store: Arc<dyn Datastore> = Arc::new(
            SqliteStore::new(&db_path, None)
                .await
                .expect("Failed to create metadata store"),
        );

        let mut config = AppConfig::for_testing();
        config.metadata = MetadataConfig::Sqlite {
            path: db_path,
            query_timeout_secs: None,
        };
        modifier(&mut config);

        let blobs = Arc::new(FakeBlobService::default());
        let state = AppState::new(config, store, blobs.clone());
        let router = create_router(state.clone());

        Self {
            router,
            state,
            blobs,
            _temp_dir: temp_dir,
        }
    }

    /// Send a request and decode the JSON response body.
    pub async fn request(
        &self,
        caller: As<'_>,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let As::Subject(subject) = caller {
            builder = builder
                .header("x-leaflet-provider", "test")
                .header("x-leaflet-subject", subject);
        }

        let body = match body {
            Some(v) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };

        let request = builder.body(body).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Sign `subject` in and create the account `name` for it.
    pub async fn register(&self, subject: &str, name: &str) {
        let (status, body) = self
            .request(
                As::Subject(subject),
                "POST",
                "/v1/users",
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {name}: {body}");
    }

    /// Create a page owned by the account registered for `subject`.
    pub async fn create_page(&self, subject: &str, name: &str, policy: &str) -> Value {
        let (status, body) = self
            .request(
                As::Subject(subject),
                "POST",
                "/v1/pages",
                Some(json!({ "name": name, "title": name, "policy": policy })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create page {name}: {body}");
        body
    }
}
