//! Page use cases.

use crate::app::App;
use crate::error::{AppError, AppResult};
use leaflet_core::{Page, Policy, TagDescriptionList, Template, Usage};
use leaflet_metadata::{PageFilter, PageOrderField, PageQuery, PageSet, SortDirection};

impl App {
    /// Read a page. Public pages are readable by anyone, private ones only by
    /// their owner.
    pub async fn get_page(&self, user_name: &str, page_name: &str) -> AppResult<Page> {
        let (user, name) = (user_name.to_string(), page_name.to_string());
        let page = self
            .tx(move |repo| Box::pin(async move { Ok(repo.get_page(&user, &name).await?) }))
            .await?;

        if page.is_public() {
            return Ok(page);
        }
        match self.current_user_name().await {
            Some(caller) if page.is_owned_by(&caller) => Ok(page),
            _ => Err(AppError::not_authorized("read page")),
        }
    }

    /// Read a page for display, with the template's defaults filled into its
    /// missing or empty tags.
    pub async fn get_page_with_defaults(&self, user_name: &str, page_name: &str) -> AppResult<Page> {
        let mut page = self.get_page(user_name, page_name).await?;
        if let Some(template) = self.page_template(&page.template_id).await? {
            page.tags.default_to(&template.page_tags);
        }
        Ok(page)
    }

    /// Public pages of every user, most recently modified first.
    pub async fn list_public_pages(&self, limit: u32) -> AppResult<PageSet> {
        let query = PageQuery::new()
            .filter(PageFilter::Policy(Policy::Public))
            .order(
                PageOrderField::LastModificationDate,
                SortDirection::Descending,
            )
            .limit(limit);
        self.tx(move |repo| Box::pin(async move { Ok(repo.query_pages(&query).await?) }))
            .await
    }

    /// The caller's own pages, most recently modified first.
    pub async fn list_owned_pages(&self, limit: u32) -> AppResult<PageSet> {
        let user = self.require_user("list pages").await?;
        let query = PageQuery::new()
            .user(user)
            .order(
                PageOrderField::LastModificationDate,
                SortDirection::Descending,
            )
            .limit(limit);
        self.tx(move |repo| Box::pin(async move { Ok(repo.query_pages(&query).await?) }))
            .await
    }

    pub async fn create_page(&self, mut page: Page) -> AppResult<Page> {
        let caller = self.require_user("create page").await?;
        if page.user_name.is_empty() {
            page.user_name = caller;
        } else if page.user_name != caller {
            return Err(AppError::not_authorized("create page"));
        }
        if page.name.is_empty() {
            return Err(AppError::validation("name", "page name must not be empty"));
        }

        let now = leaflet_core::now();
        page.creation_date = now;
        page.last_modification_date = now;

        let stored = page.clone();
        self.tx(move |repo| {
            Box::pin(async move {
                if repo.find_page(&stored.user_name, &stored.name).await? {
                    return Err(AppError::AlreadyExists {
                        entity: "page",
                        id: format!("{}/{}", stored.user_name, stored.name),
                    });
                }
                repo.store_page(&stored).await?;
                Ok(())
            })
        })
        .await?;

        tracing::info!(user_name = %page.user_name, page_name = %page.name, "page created");
        Ok(page)
    }

    /// Replace a page and rebuild its image usage records.
    ///
    /// `schema` is the page-tag schema of the page's template. Every
    /// `imageId` entry with a non-empty value on the updated page yields one
    /// usage record; all previous records of the page are dropped.
    pub async fn update_page(&self, mut page: Page, schema: &TagDescriptionList) -> AppResult<Page> {
        self.require_owner(&page.user_name, "update page").await?;
        page.last_modification_date = leaflet_core::now();

        let usages: Vec<Usage> = schema
            .image_ids()
            .filter_map(|desc| page.tags.tag(&desc.key))
            .filter(|value| !value.is_empty())
            .map(|image_id| Usage::new(page.user_name.clone(), page.name.clone(), image_id))
            .collect();

        let page = self
            .tx(move |repo| {
                Box::pin(async move {
                    let existing = repo.get_page(&page.user_name, &page.name).await?;
                    page.creation_date = existing.creation_date;
                    repo.store_page(&page).await?;

                    let dropped = repo.delete_usages(&page.user_name, &page.name).await?;
                    for usage in &usages {
                        repo.store_usage(usage).await?;
                    }
                    tracing::debug!(
                        user_name = %page.user_name,
                        page_name = %page.name,
                        dropped,
                        stored = usages.len(),
                        "rebuilt image usages"
                    );
                    Ok(page)
                })
            })
            .await?;
        Ok(page)
    }

    /// Page-tag schema of a template.
    ///
    /// An empty id, or one naming a template that no longer exists, yields an
    /// empty schema.
    pub async fn page_tag_schema(&self, template_id: &str) -> AppResult<TagDescriptionList> {
        Ok(self
            .page_template(template_id)
            .await?
            .map(|template| template.page_tags)
            .unwrap_or_default())
    }

    /// The template a page refers to, if it has one that still exists.
    pub(crate) async fn page_template(&self, template_id: &str) -> AppResult<Option<Template>> {
        if template_id.is_empty() {
            return Ok(None);
        }
        match self.get_template(template_id).await {
            Ok(template) => Ok(Some(template)),
            Err(e) if e.is_not_found() => {
                tracing::warn!(template_id, "page refers to a missing template");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Switch a page to another template. Unchanged ids write nothing.
    pub async fn update_template(
        &self,
        user_name: &str,
        page_name: &str,
        template_id: &str,
    ) -> AppResult<Page> {
        self.require_owner(user_name, "update page template").await?;
        let (user, name, template_id) = (
            user_name.to_string(),
            page_name.to_string(),
            template_id.to_string(),
        );
        self.tx(move |repo| {
            Box::pin(async move {
                let mut page = repo.get_page(&user, &name).await?;
                if page.template_id == template_id {
                    return Ok(page);
                }
                page.template_id = template_id;
                page.last_modification_date = leaflet_core::now();
                repo.store_page(&page).await?;
                Ok(page)
            })
        })
        .await
    }

    /// Delete a page and its items.
    ///
    /// Items go first, the page second, in separate transactions. Usage
    /// records of the page are left in place.
    pub async fn delete_page(&self, user_name: &str, page_name: &str) -> AppResult<()> {
        self.require_owner(user_name, "delete page").await?;

        let (user, name) = (user_name.to_string(), page_name.to_string());
        let items = self
            .tx(move |repo| {
                Box::pin(async move { Ok(repo.delete_items_from_page(&user, &name).await?) })
            })
            .await?;

        let (user, name) = (user_name.to_string(), page_name.to_string());
        if let Err(e) = self
            .tx(move |repo| Box::pin(async move { Ok(repo.delete_page(&user, &name).await?) }))
            .await
        {
            tracing::error!(
                user_name,
                page_name,
                items,
                error = %e,
                "items deleted but page deletion failed"
            );
            return Err(e);
        }

        tracing::info!(user_name, page_name, items, "page deleted");
        Ok(())
    }
}
