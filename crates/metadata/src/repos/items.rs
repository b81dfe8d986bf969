//! Item repository.

use crate::error::MetadataResult;
use async_trait::async_trait;
use leaflet_core::{IdGenerator, Item};

/// Repository for the items of a page.
#[async_trait]
pub trait ItemRepo: Send {
    /// Items of a page, most recently modified first.
    async fn get_items_from_page(
        &mut self,
        user_name: &str,
        page_name: &str,
        limit: u32,
    ) -> MetadataResult<Vec<Item>>;

    /// Delete every item of a page. Returns the number of items removed.
    async fn delete_items_from_page(
        &mut self,
        user_name: &str,
        page_name: &str,
    ) -> MetadataResult<u64>;

    /// Whether an item exists.
    async fn find_item(&mut self, user_name: &str, page_name: &str, id: &str)
    -> MetadataResult<bool>;

    /// Get an item. Fails with `NotFound` if it does not exist.
    async fn get_item(&mut self, user_name: &str, page_name: &str, id: &str)
    -> MetadataResult<Item>;

    /// Insert or fully replace an item under its current id.
    async fn store_item(
        &mut self,
        user_name: &str,
        page_name: &str,
        item: &Item,
    ) -> MetadataResult<()>;

    /// Delete an item.
    async fn delete_item(&mut self, user_name: &str, page_name: &str, id: &str)
    -> MetadataResult<()>;

    /// Assign a fresh id that no sibling in the page uses, then store the item.
    ///
    /// Must run inside the same transaction as the uniqueness checks for the
    /// result to hold. Returns the new id.
    async fn create_item(
        &mut self,
        user_name: &str,
        page_name: &str,
        item: &mut Item,
        ids: &dyn IdGenerator,
    ) -> MetadataResult<String> {
        let mut id = ids.generate();
        while self.find_item(user_name, page_name, &id).await? {
            tracing::debug!(user_name, page_name, id = %id, "item id collision, regenerating");
            id = ids.generate();
        }
        item.id = id.clone();
        self.store_item(user_name, page_name, item).await?;
        Ok(id)
    }
}
