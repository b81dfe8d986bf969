//! Item use cases.
//!
//! Every item write is followed by a second transaction that bumps the parent
//! page's modification date. The two are not atomic: when the second one
//! fails the item stays stored and the error is returned.

use crate::app::App;
use crate::error::{AppError, AppResult};
use leaflet_core::Item;
use leaflet_metadata::MetadataError;
use time::OffsetDateTime;

impl App {
    /// Items of a readable page, most recently modified first.
    pub async fn list_items(
        &self,
        user_name: &str,
        page_name: &str,
        limit: u32,
    ) -> AppResult<Vec<Item>> {
        self.get_page(user_name, page_name).await?;
        self.items_of(user_name, page_name, limit).await
    }

    /// Items of a readable page for display, with the page template's item
    /// defaults filled into missing or empty tags.
    pub async fn list_items_with_defaults(
        &self,
        user_name: &str,
        page_name: &str,
        limit: u32,
    ) -> AppResult<Vec<Item>> {
        let page = self.get_page(user_name, page_name).await?;
        let mut items = self.items_of(user_name, page_name, limit).await?;
        if let Some(template) = self.page_template(&page.template_id).await? {
            for item in &mut items {
                item.tags.default_to(&template.item_tags);
            }
        }
        Ok(items)
    }

    pub async fn get_item(&self, user_name: &str, page_name: &str, id: &str) -> AppResult<Item> {
        self.get_page(user_name, page_name).await?;
        let (user, page, id) = (user_name.to_string(), page_name.to_string(), id.to_string());
        self.tx(move |repo| Box::pin(async move { Ok(repo.get_item(&user, &page, &id).await?) }))
            .await
    }

    /// Store a new item under a freshly generated id.
    pub async fn create_item(
        &self,
        user_name: &str,
        page_name: &str,
        mut item: Item,
    ) -> AppResult<Item> {
        self.require_owner(user_name, "create item").await?;
        self.prepare_item(&mut item)?;
        let now = leaflet_core::now();
        item.creation_date = now;
        item.last_modification_date = now;

        let (user, page) = (user_name.to_string(), page_name.to_string());
        let ids = self.ids();
        let item = self
            .tx(move |repo| {
                Box::pin(async move {
                    ensure_page(repo.find_page(&user, &page).await?, &user, &page)?;
                    repo.create_item(&user, &page, &mut item, ids.as_ref())
                        .await?;
                    Ok(item)
                })
            })
            .await?;

        tracing::debug!(user_name, page_name, id = %item.id, "item created");
        self.touch_page(user_name, page_name, item.last_modification_date)
            .await?;
        Ok(item)
    }

    /// Store an item under its own id, replacing whatever was there.
    ///
    /// The item's timestamps are kept as given.
    pub async fn put_item(&self, user_name: &str, page_name: &str, mut item: Item) -> AppResult<Item> {
        self.require_owner(user_name, "put item").await?;
        if item.id.is_empty() {
            return Err(AppError::validation("id", "item id must not be empty"));
        }
        self.prepare_item(&mut item)?;

        let (user, page) = (user_name.to_string(), page_name.to_string());
        let item = self
            .tx(move |repo| {
                Box::pin(async move {
                    ensure_page(repo.find_page(&user, &page).await?, &user, &page)?;
                    repo.store_item(&user, &page, &item).await?;
                    Ok(item)
                })
            })
            .await?;

        self.touch_page(user_name, page_name, item.last_modification_date)
            .await?;
        Ok(item)
    }

    /// Replace an existing item, keeping its creation date.
    ///
    /// With `update_tags` false the stored tags are kept and the tags on
    /// `item` are ignored.
    pub async fn update_item(
        &self,
        user_name: &str,
        page_name: &str,
        mut item: Item,
        update_tags: bool,
    ) -> AppResult<Item> {
        self.require_owner(user_name, "update item").await?;
        if item.id.is_empty() {
            return Err(AppError::validation("id", "item id must not be empty"));
        }
        self.prepare_item(&mut item)?;
        item.last_modification_date = leaflet_core::now();

        let (user, page) = (user_name.to_string(), page_name.to_string());
        let item = self
            .tx(move |repo| {
                Box::pin(async move {
                    let old = repo.get_item(&user, &page, &item.id).await?;
                    item.creation_date = old.creation_date;
                    if !update_tags {
                        item.tags = old.tags;
                    }
                    repo.store_item(&user, &page, &item).await?;
                    Ok(item)
                })
            })
            .await?;

        self.touch_page(user_name, page_name, item.last_modification_date)
            .await?;
        Ok(item)
    }

    /// Set one tag on an item.
    pub async fn set_item_tag(
        &self,
        user_name: &str,
        page_name: &str,
        id: &str,
        key: &str,
        value: &str,
    ) -> AppResult<Item> {
        self.require_owner(user_name, "tag item").await?;
        if key.is_empty() {
            return Err(AppError::validation("key", "tag key must not be empty"));
        }

        let now = leaflet_core::now();
        let (user, page, id) = (user_name.to_string(), page_name.to_string(), id.to_string());
        let (key, value) = (key.to_string(), value.to_string());
        let item = self
            .tx(move |repo| {
                Box::pin(async move {
                    let mut item = repo.get_item(&user, &page, &id).await?;
                    item.tags.set_tag(key, value);
                    item.last_modification_date = now;
                    repo.store_item(&user, &page, &item).await?;
                    Ok(item)
                })
            })
            .await?;

        self.touch_page(user_name, page_name, now).await?;
        Ok(item)
    }

    /// Delete an item. The page's modification date is left alone.
    pub async fn delete_item(&self, user_name: &str, page_name: &str, id: &str) -> AppResult<()> {
        self.require_owner(user_name, "delete item").await?;
        let (user, page, id) = (user_name.to_string(), page_name.to_string(), id.to_string());
        self.tx(move |repo| Box::pin(async move { Ok(repo.delete_item(&user, &page, &id).await?) }))
            .await
    }

    async fn items_of(
        &self,
        user_name: &str,
        page_name: &str,
        limit: u32,
    ) -> AppResult<Vec<Item>> {
        let (user, page) = (user_name.to_string(), page_name.to_string());
        self.tx(move |repo| {
            Box::pin(async move { Ok(repo.get_items_from_page(&user, &page, limit).await?) })
        })
        .await
    }

    fn prepare_item(&self, item: &mut Item) -> AppResult<()> {
        if !item.has_body() {
            return Err(AppError::validation(
                "content",
                "an item needs markdown content or a url",
            ));
        }
        item.html_content = self.renderer().render(&item.content);
        Ok(())
    }

    async fn touch_page(
        &self,
        user_name: &str,
        page_name: &str,
        at: OffsetDateTime,
    ) -> AppResult<()> {
        let (user, page) = (user_name.to_string(), page_name.to_string());
        let touched = self
            .tx(move |repo| Box::pin(async move { Ok(repo.touch_page(&user, &page, at).await?) }))
            .await;
        if let Err(e) = &touched {
            tracing::error!(
                user_name,
                page_name,
                error = %e,
                "item stored but page modification date was not updated"
            );
        }
        touched
    }
}

fn ensure_page(exists: bool, user_name: &str, page_name: &str) -> Result<(), MetadataError> {
    if exists {
        Ok(())
    } else {
        Err(MetadataError::not_found(
            "page",
            format!("{user_name}/{page_name}"),
        ))
    }
}
