//! Uploaded image repository.

use crate::error::MetadataResult;
use async_trait::async_trait;
use leaflet_core::UploadInfo;

/// Repository for a user's uploaded images.
#[async_trait]
pub trait ImageRepo: Send {
    /// Images of a user ordered by filename.
    async fn get_images(&mut self, user_name: &str, limit: u32) -> MetadataResult<Vec<UploadInfo>>;

    /// Get one image. Fails with `NotFound` if it does not exist.
    async fn get_image(&mut self, user_name: &str, id: &str) -> MetadataResult<UploadInfo>;

    /// Insert or fully replace an image record, keyed by `upload.key`.
    async fn store_image(&mut self, user_name: &str, upload: &UploadInfo) -> MetadataResult<()>;

    async fn delete_image(&mut self, user_name: &str, id: &str) -> MetadataResult<()>;

    /// Change an image's filename.
    ///
    /// Returns `false` without writing when the name is unchanged.
    async fn rename_image(&mut self, user_name: &str, id: &str, name: &str) -> MetadataResult<bool> {
        let mut upload = self.get_image(user_name, id).await?;
        if upload.filename == name {
            return Ok(false);
        }
        upload.filename = name.to_string();
        self.store_image(user_name, &upload).await?;
        Ok(true)
    }
}
