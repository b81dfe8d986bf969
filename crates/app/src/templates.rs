//! Site-wide template registry.

use crate::app::App;
use crate::error::AppResult;
use leaflet_core::Template;

impl App {
    /// Create or replace a template. Admin only. Returns the template id.
    pub async fn store_template(&self, mut template: Template) -> AppResult<String> {
        self.require_admin("store template")?;
        template.last_modification_date = leaflet_core::now();
        let ids = self.ids();
        let id = self
            .tx(move |repo| {
                Box::pin(async move { Ok(repo.store_template(&mut template, ids.as_ref()).await?) })
            })
            .await?;
        tracing::info!(template_id = %id, "template stored");
        Ok(id)
    }

    pub async fn get_template(&self, id: &str) -> AppResult<Template> {
        let id = id.to_string();
        self.tx(move |repo| Box::pin(async move { Ok(repo.get_template(&id).await?) }))
            .await
    }

    pub async fn get_all_templates(&self) -> AppResult<Vec<Template>> {
        self.tx(|repo| Box::pin(async move { Ok(repo.get_all_templates().await?) }))
            .await
    }

    pub async fn delete_template(&self, id: &str) -> AppResult<()> {
        self.require_admin("delete template")?;
        let template_id = id.to_string();
        self.tx(move |repo| Box::pin(async move { Ok(repo.delete_template(&template_id).await?) }))
            .await?;
        tracing::info!(template_id = %id, "template deleted");
        Ok(())
    }
}
