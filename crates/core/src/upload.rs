//! Uploaded images and the usage records that tie them to pages.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Metadata of an uploaded blob, stored under `(user_name, key)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadInfo {
    /// Blob key; doubles as the image id.
    pub key: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default = "crate::now", with = "time::serde::rfc3339")]
    pub creation_time: OffsetDateTime,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub size: u64,
}

impl UploadInfo {
    /// Whether the blob is small enough to accept.
    pub fn within_limit(&self, max_bytes: u64) -> bool {
        self.size <= max_bytes
    }
}

/// Records that a page's tags reference an uploaded image.
///
/// Keyed by `(user_name, page_name, image_id)` and fully derived from the
/// page's image-id tags.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Usage {
    pub user_name: String,
    pub page_name: String,
    pub image_id: String,
}

impl Usage {
    pub fn new(
        user_name: impl Into<String>,
        page_name: impl Into<String>,
        image_id: impl Into<String>,
    ) -> Self {
        Self {
            user_name: user_name.into(),
            page_name: page_name.into(),
            image_id: image_id.into(),
        }
    }
}
