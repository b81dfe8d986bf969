//! User and identity repository.

use crate::error::MetadataResult;
use async_trait::async_trait;
use leaflet_core::{Ident, Identity, User};

/// Repository for users and the external identities linked to them.
#[async_trait]
pub trait UserRepo: Send {
    /// Whether a user name is taken.
    async fn find_user(&mut self, name: &str) -> MetadataResult<bool>;

    /// Get a user by name.
    async fn get_user_by_name(&mut self, name: &str) -> MetadataResult<User>;

    /// Get the identity record for an external identity.
    async fn get_identity(&mut self, ident: &Ident) -> MetadataResult<Identity>;

    async fn store_user(&mut self, user: &User) -> MetadataResult<()>;

    async fn store_identity(&mut self, identity: &Identity) -> MetadataResult<()>;

    /// Resolve an external identity to its user.
    async fn get_user(&mut self, ident: &Ident) -> MetadataResult<User> {
        let identity = self.get_identity(ident).await?;
        self.get_user_by_name(&identity.user_name).await
    }
}
