//! JSON export and import of whole pages.

use crate::app::App;
use crate::error::AppResult;
use leaflet_core::{Item, Page};
use serde::{Deserialize, Serialize};

/// Items included in one export.
pub const EXPORT_ITEM_LIMIT: u32 = 1000;

/// A page together with its items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageExport {
    pub page: Page,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Outcome of an import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub updated: usize,
    pub created: usize,
}

impl App {
    /// Export a readable page with template defaults filled into its tags.
    pub async fn export_page(&self, user_name: &str, page_name: &str) -> AppResult<PageExport> {
        let page = self.get_page_with_defaults(user_name, page_name).await?;
        let items = self
            .list_items_with_defaults(user_name, page_name, EXPORT_ITEM_LIMIT)
            .await?;
        Ok(PageExport { page, items })
    }

    /// Load an export into `(user_name, page_name)`.
    ///
    /// The page is updated, or created when missing. Each item is updated in
    /// place and created under a new id when that fails.
    pub async fn import_page(
        &self,
        user_name: &str,
        page_name: &str,
        export: PageExport,
    ) -> AppResult<ImportSummary> {
        let PageExport { mut page, items } = export;
        page.user_name = user_name.to_string();
        page.name = page_name.to_string();

        let schema = self.page_tag_schema(&page.template_id).await?;
        match self.update_page(page.clone(), &schema).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                self.create_page(page.clone()).await?;
                self.update_page(page, &schema).await?;
            }
            Err(e) => return Err(e),
        }

        let mut summary = ImportSummary::default();
        for item in items {
            match self
                .update_item(user_name, page_name, item.clone(), true)
                .await
            {
                Ok(_) => summary.updated += 1,
                Err(e) => {
                    tracing::debug!(id = %item.id, error = %e, "update failed, creating item instead");
                    self.create_item(user_name, page_name, item).await?;
                    summary.created += 1;
                }
            }
        }

        tracing::info!(
            user_name,
            page_name,
            updated = summary.updated,
            created = summary.created,
            "page imported"
        );
        Ok(summary)
    }
}
