//! Template repository.

use crate::error::{MetadataError, MetadataResult};
use async_trait::async_trait;
use leaflet_core::{IdGenerator, Template};

/// Repository for global page templates.
#[async_trait]
pub trait TemplateRepo: Send {
    async fn get_template(&mut self, id: &str) -> MetadataResult<Template>;

    async fn find_template(&mut self, id: &str) -> MetadataResult<bool>;

    /// All templates ordered by name.
    async fn get_all_templates(&mut self) -> MetadataResult<Vec<Template>>;

    /// Insert or fully replace a template under its current id.
    async fn put_template(&mut self, template: &Template) -> MetadataResult<()>;

    async fn delete_template(&mut self, id: &str) -> MetadataResult<()>;

    /// Store a template, assigning a globally unique id when it has none.
    ///
    /// An existing template keeps its stored creation date; a new one gets
    /// its last modification date as creation date. Returns the id.
    async fn store_template(
        &mut self,
        template: &mut Template,
        ids: &dyn IdGenerator,
    ) -> MetadataResult<String> {
        if template.id.is_empty() {
            let mut id = ids.generate();
            while self.find_template(&id).await? {
                tracing::debug!(id = %id, "template id collision, regenerating");
                id = ids.generate();
            }
            template.id = id;
            template.creation_date = template.last_modification_date;
        } else {
            match self.get_template(&template.id).await {
                Ok(existing) => template.creation_date = existing.creation_date,
                Err(MetadataError::NotFound { .. }) => {
                    template.creation_date = template.last_modification_date;
                }
                Err(e) => return Err(e),
            }
        }
        self.put_template(template).await?;
        Ok(template.id.clone())
    }
}
