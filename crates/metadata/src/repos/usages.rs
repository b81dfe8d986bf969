//! Image usage repository.

use crate::error::MetadataResult;
use async_trait::async_trait;
use leaflet_core::Usage;

/// Repository for page-to-image usage records.
#[async_trait]
pub trait UsageRepo: Send {
    /// Whether any page of any user references the image id.
    async fn is_used(&mut self, image_id: &str) -> MetadataResult<bool>;

    async fn get_usage(
        &mut self,
        user_name: &str,
        page_name: &str,
        image_id: &str,
    ) -> MetadataResult<Usage>;

    /// Usage records of a page, ordered by image id.
    async fn get_usages(&mut self, user_name: &str, page_name: &str) -> MetadataResult<Vec<Usage>>;

    async fn store_usage(&mut self, usage: &Usage) -> MetadataResult<()>;

    async fn delete_usage(
        &mut self,
        user_name: &str,
        page_name: &str,
        image_id: &str,
    ) -> MetadataResult<()>;

    /// Delete every usage record of a page. Returns the number removed.
    async fn delete_usages(&mut self, user_name: &str, page_name: &str) -> MetadataResult<u64>;
}
