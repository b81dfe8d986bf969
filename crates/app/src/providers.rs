//! Collaborators the use cases depend on but do not implement.

use crate::error::ProviderError;
use async_trait::async_trait;
use leaflet_core::Ident;

/// Who is calling. One instance describes one request's caller.
pub trait IdentityProvider: Send + Sync {
    /// External identity of the caller, `None` when anonymous.
    fn current_ident(&self) -> Option<Ident>;

    /// Whether the caller is a site administrator.
    fn is_admin(&self) -> bool;

    fn login_url(&self, return_path: &str) -> String;

    fn logout_url(&self, return_path: &str) -> String;
}

/// Blob storage for uploaded images.
#[async_trait]
pub trait UploadProvider: Send + Sync {
    /// URL a client uploads to. After the upload the blob service redirects
    /// or calls back to `destination`.
    fn upload_url(&self, destination: &str, max_bytes: u64) -> Result<String, ProviderError>;

    /// Public URL serving a blob, optionally resized to `size` pixels.
    fn serving_url(
        &self,
        blob_key: &str,
        secure: bool,
        size: Option<u32>,
    ) -> Result<String, ProviderError>;

    async fn delete_blob(&self, blob_key: &str) -> Result<(), ProviderError>;
}
