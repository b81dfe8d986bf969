//! Page repository.

use crate::error::MetadataResult;
use crate::query::{PageQuery, PageSet};
use async_trait::async_trait;
use leaflet_core::Page;
use time::OffsetDateTime;

/// Repository for page operations.
#[async_trait]
pub trait PageRepo: Send {
    /// Get a page. Fails with `NotFound` if it does not exist.
    async fn get_page(&mut self, user_name: &str, name: &str) -> MetadataResult<Page>;

    /// Whether a page exists.
    async fn find_page(&mut self, user_name: &str, name: &str) -> MetadataResult<bool>;

    /// Insert or fully replace a page.
    async fn store_page(&mut self, page: &Page) -> MetadataResult<()>;

    /// Delete a page. Its items and usage records are left alone.
    async fn delete_page(&mut self, user_name: &str, name: &str) -> MetadataResult<()>;

    /// Run a page query. Backends fetch `query.fetch_limit()` rows and return
    /// `query.paginate(rows)`.
    async fn query_pages(&mut self, query: &PageQuery) -> MetadataResult<PageSet>;

    /// Re-read a page and set its last modification date to `at`.
    async fn touch_page(
        &mut self,
        user_name: &str,
        name: &str,
        at: OffsetDateTime,
    ) -> MetadataResult<()> {
        let mut page = self.get_page(user_name, name).await?;
        page.last_modification_date = at;
        self.store_page(&page).await
    }
}
