//! The per-request application facade.

use crate::error::{AppError, AppResult};
use crate::markdown::{MarkdownRenderer, SanitizedMarkdown};
use crate::providers::{IdentityProvider, UploadProvider};
use futures::future::BoxFuture;
use leaflet_core::{DEFAULT_MAX_UPLOAD_BYTES, IdGenerator, Identity, RandomIdGenerator, User};
use leaflet_metadata::{Datastore, Repository, run_in_transaction};
use std::sync::Arc;

/// Shared collaborators, cloned into every request's [`App`].
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn Datastore>,
    uploads: Arc<dyn UploadProvider>,
    renderer: Arc<dyn MarkdownRenderer>,
    ids: Arc<dyn IdGenerator>,
    max_upload_bytes: u64,
}

impl AppServices {
    pub fn new(store: Arc<dyn Datastore>, uploads: Arc<dyn UploadProvider>) -> Self {
        Self {
            store,
            uploads,
            renderer: Arc::new(SanitizedMarkdown::new()),
            ids: Arc::new(RandomIdGenerator),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn MarkdownRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn store(&self) -> &Arc<dyn Datastore> {
        &self.store
    }

    /// Build the facade for one caller.
    pub fn app(&self, identity: Arc<dyn IdentityProvider>) -> App {
        App {
            services: self.clone(),
            identity,
        }
    }
}

/// Use cases as seen by a single caller.
///
/// Every operation authorizes against the caller's identity, runs one or more
/// repository transactions and keeps derived records consistent.
pub struct App {
    services: AppServices,
    identity: Arc<dyn IdentityProvider>,
}

impl App {
    pub(crate) fn uploads(&self) -> &dyn UploadProvider {
        self.services.uploads.as_ref()
    }

    pub(crate) fn renderer(&self) -> &dyn MarkdownRenderer {
        self.services.renderer.as_ref()
    }

    pub(crate) fn ids(&self) -> Arc<dyn IdGenerator> {
        Arc::clone(&self.services.ids)
    }

    pub(crate) fn max_upload_bytes(&self) -> u64 {
        self.services.max_upload_bytes
    }

    /// Run `f` in a fresh transaction on the backing store.
    pub(crate) async fn tx<T, F>(&self, f: F) -> AppResult<T>
    where
        F: for<'t> FnOnce(&'t mut dyn Repository) -> BoxFuture<'t, AppResult<T>> + Send,
        T: Send,
    {
        run_in_transaction(self.services.store.as_ref(), f).await
    }

    /// Identity record of the caller.
    ///
    /// `Ok(None)` for anonymous callers, `FirstLoginPending` for a signed-in
    /// ident that has not created an account yet.
    pub async fn current_identity(&self) -> AppResult<Option<Identity>> {
        let Some(ident) = self.identity.current_ident() else {
            return Ok(None);
        };
        let lookup = ident.clone();
        let found = self
            .tx(move |repo| Box::pin(async move { Ok(repo.get_identity(&lookup).await?) }))
            .await;
        match found {
            Ok(identity) => Ok(Some(identity)),
            Err(AppError::NotFound { .. }) => Err(AppError::FirstLoginPending { ident }),
            Err(e) => Err(e),
        }
    }

    /// The caller's user name, `None` when anonymous or not yet registered.
    pub async fn current_user_name(&self) -> Option<String> {
        match self.current_identity().await {
            Ok(identity) => identity.map(|i| i.user_name),
            Err(AppError::FirstLoginPending { .. }) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to resolve current identity");
                None
            }
        }
    }

    pub async fn current_user(&self) -> AppResult<User> {
        let identity = self
            .current_identity()
            .await?
            .ok_or_else(|| AppError::not_authorized("view current user"))?;
        self.tx(move |repo| {
            Box::pin(async move { Ok(repo.get_user_by_name(&identity.user_name).await?) })
        })
        .await
    }

    pub fn current_user_is_admin(&self) -> bool {
        self.identity.is_admin()
    }

    pub fn login_url(&self, return_path: &str) -> String {
        self.identity.login_url(return_path)
    }

    pub fn logout_url(&self, return_path: &str) -> String {
        self.identity.logout_url(return_path)
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// The caller's user name, or `NotAuthorized(operation)`.
    pub(crate) async fn require_user(&self, operation: &str) -> AppResult<String> {
        self.current_user_name()
            .await
            .ok_or_else(|| AppError::not_authorized(operation))
    }

    /// Fails unless the caller is `owner`.
    pub(crate) async fn require_owner(&self, owner: &str, operation: &str) -> AppResult<()> {
        match self.current_user_name().await {
            Some(name) if name == owner => Ok(()),
            _ => Err(AppError::not_authorized(operation)),
        }
    }

    pub(crate) fn require_admin(&self, operation: &str) -> AppResult<()> {
        if self.identity.is_admin() {
            Ok(())
        } else {
            Err(AppError::not_authorized(operation))
        }
    }
}
