//! Uploaded image lifecycle.

use crate::app::App;
use crate::error::{AppError, AppResult};
use leaflet_core::UploadInfo;

impl App {
    /// Where the caller should upload a new image.
    pub async fn upload_url(&self, destination: &str) -> AppResult<String> {
        self.require_user("upload image").await?;
        Ok(self
            .uploads()
            .upload_url(destination, self.max_upload_bytes())?)
    }

    /// Record a finished upload under the caller's account.
    pub async fn store_image(&self, upload: UploadInfo) -> AppResult<UploadInfo> {
        let user = self.require_user("store image").await?;
        if upload.key.is_empty() {
            return Err(AppError::validation("key", "upload key must not be empty"));
        }
        if !upload.within_limit(self.max_upload_bytes()) {
            return Err(AppError::validation(
                "size",
                format!(
                    "{} bytes exceeds the {} byte limit",
                    upload.size,
                    self.max_upload_bytes()
                ),
            ));
        }

        let upload = self
            .tx(move |repo| {
                Box::pin(async move {
                    repo.store_image(&user, &upload).await?;
                    Ok(upload)
                })
            })
            .await?;
        tracing::debug!(key = %upload.key, size = upload.size, "image stored");
        Ok(upload)
    }

    /// Rename an image. Returns whether anything changed.
    pub async fn rename_image(&self, id: &str, name: &str) -> AppResult<bool> {
        let user = self.require_user("rename image").await?;
        let (id, name) = (id.to_string(), name.to_string());
        self.tx(move |repo| Box::pin(async move { Ok(repo.rename_image(&user, &id, &name).await?) }))
            .await
    }

    /// Delete an image record, then its blob.
    ///
    /// Pages that still reference the image are not checked.
    pub async fn delete_image(&self, id: &str) -> AppResult<()> {
        let user = self.require_user("delete image").await?;
        let key = id.to_string();
        self.tx(move |repo| Box::pin(async move { Ok(repo.delete_image(&user, &key).await?) }))
            .await?;

        if let Err(e) = self.uploads().delete_blob(id).await {
            tracing::error!(key = %id, error = %e, "image record deleted but blob deletion failed");
            return Err(e.into());
        }
        tracing::info!(key = %id, "image deleted");
        Ok(())
    }

    /// The caller's uploads, ordered by file name.
    pub async fn images(&self, limit: u32) -> AppResult<Vec<UploadInfo>> {
        let user = self.require_user("list images").await?;
        self.tx(move |repo| Box::pin(async move { Ok(repo.get_images(&user, limit).await?) }))
            .await
    }

    /// Serving URL of an image.
    ///
    /// Public pages reference images by id in `imageId` tags, so anyone who
    /// can read such a page must be able to resolve them. No identity is
    /// needed and the upload record is not consulted.
    pub fn image_url(&self, id: &str, secure: bool, size: Option<u32>) -> AppResult<String> {
        if id.is_empty() {
            return Err(AppError::validation("id", "image id must not be empty"));
        }
        Ok(self.uploads().serving_url(id, secure, size)?)
    }
}
