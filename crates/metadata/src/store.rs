//! Datastore trait and the SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::{ImageRepo, ItemRepo, PageRepo, Repository, TemplateRepo, UsageRepo, UserRepo};
use async_trait::async_trait;
use futures::future::BoxFuture;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// An open transaction.
///
/// Writes made through the [`Repository`] methods become visible to others
/// only after [`Transaction::commit`]. Dropping a transaction without
/// committing discards its writes.
pub trait Transaction: Repository {
    /// View this transaction as a plain repository.
    fn repository(&mut self) -> &mut dyn Repository;

    fn commit(self: Box<Self>) -> BoxFuture<'static, MetadataResult<()>>;

    fn rollback(self: Box<Self>) -> BoxFuture<'static, MetadataResult<()>>;
}

/// Source of transactions over the persistent store.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Open a new transaction.
    async fn begin(&self) -> MetadataResult<Box<dyn Transaction>>;

    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based datastore.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    query_timeout_secs: u64,
}

impl SqliteStore {
    /// Open (creating if needed) a SQLite database and apply the schema.
    pub async fn new(
        path: impl AsRef<Path>,
        query_timeout_secs: Option<u64>,
    ) -> MetadataResult<Self> {
        let path = path.as_ref();
        let query_timeout_secs = query_timeout_secs.unwrap_or(600);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // A single connection serializes transactions; concurrent callers
            // queue on the pool instead of failing with SQLITE_BUSY.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self {
            pool,
            query_timeout_secs,
        };
        store.migrate().await?;

        tracing::debug!(
            path = %path.display(),
            query_timeout_secs = store.query_timeout_secs,
            "SQLite datastore ready (query timeout is advisory only)"
        );

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl Datastore for SqliteStore {
    async fn begin(&self) -> MetadataResult<Box<dyn Transaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTransaction { tx }))
    }

    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// A transaction on a [`SqliteStore`].
pub struct SqliteTransaction {
    tx: sqlx::Transaction<'static, Sqlite>,
}

impl Transaction for SqliteTransaction {
    fn repository(&mut self) -> &mut dyn Repository {
        self
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, MetadataResult<()>> {
        Box::pin(async move {
            self.tx.commit().await?;
            Ok(())
        })
    }

    fn rollback(self: Box<Self>) -> BoxFuture<'static, MetadataResult<()>> {
        Box::pin(async move {
            self.tx.rollback().await?;
            Ok(())
        })
    }
}

// Implement all the repository traits for SqliteTransaction
mod sqlite_impl {
    use super::*;
    use crate::models::*;
    use crate::query::{PageQuery, PageSet};
    use leaflet_core::{Ident, Identity, Item, Page, Template, UploadInfo, Usage, User};

    fn page_key(user_name: &str, name: &str) -> String {
        format!("{user_name}/{name}")
    }

    #[async_trait]
    impl PageRepo for SqliteTransaction {
        async fn get_page(&mut self, user_name: &str, name: &str) -> MetadataResult<Page> {
            let row = sqlx::query_as::<_, PageRow>(
                "SELECT * FROM pages WHERE user_name = ? AND name = ?",
            )
            .bind(user_name)
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| MetadataError::not_found("page", page_key(user_name, name)))?;
            row.try_into()
        }

        async fn find_page(&mut self, user_name: &str, name: &str) -> MetadataResult<bool> {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM pages WHERE user_name = ? AND name = ?)",
            )
            .bind(user_name)
            .bind(name)
            .fetch_one(&mut *self.tx)
            .await?;
            Ok(exists)
        }

        async fn store_page(&mut self, page: &Page) -> MetadataResult<()> {
            let row = PageRow::try_from(page)?;
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO pages (
                    user_name, name, title, content_license, policy, template_id,
                    creation_date, last_modification_date, tags
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&row.user_name)
            .bind(&row.name)
            .bind(&row.title)
            .bind(&row.content_license)
            .bind(&row.policy)
            .bind(&row.template_id)
            .bind(row.creation_date)
            .bind(row.last_modification_date)
            .bind(&row.tags)
            .execute(&mut *self.tx)
            .await?;
            Ok(())
        }

        async fn delete_page(&mut self, user_name: &str, name: &str) -> MetadataResult<()> {
            sqlx::query("DELETE FROM pages WHERE user_name = ? AND name = ?")
                .bind(user_name)
                .bind(name)
                .execute(&mut *self.tx)
                .await?;
            Ok(())
        }

        async fn query_pages(&mut self, query: &PageQuery) -> MetadataResult<PageSet> {
            let mut conditions: Vec<String> = Vec::new();
            let mut binds: Vec<&str> = Vec::new();

            if let Some(user_name) = query.user_name() {
                conditions.push("user_name = ?".to_string());
                binds.push(user_name);
            }
            for filter in query.filters() {
                conditions.push(format!("{} = ?", filter.column()));
                binds.push(filter.value());
            }

            let mut sql = String::from("SELECT * FROM pages");
            if !conditions.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&conditions.join(" AND "));
            }
            if let Some((field, direction)) = query.ordering() {
                sql.push_str(&format!(
                    " ORDER BY {} {}, user_name, name",
                    field.column(),
                    direction.as_sql()
                ));
            }
            if query.fetch_limit().is_some() {
                sql.push_str(" LIMIT ?");
            }

            let mut q = sqlx::query_as::<_, PageRow>(&sql);
            for value in binds {
                q = q.bind(value);
            }
            if let Some(limit) = query.fetch_limit() {
                q = q.bind(i64::from(limit));
            }

            let rows = q.fetch_all(&mut *self.tx).await?;
            let pages = rows
                .into_iter()
                .map(Page::try_from)
                .collect::<MetadataResult<Vec<_>>>()?;
            Ok(query.paginate(pages))
        }
    }

    #[async_trait]
    impl ItemRepo for SqliteTransaction {
        async fn get_items_from_page(
            &mut self,
            user_name: &str,
            page_name: &str,
            limit: u32,
        ) -> MetadataResult<Vec<Item>> {
            let rows = sqlx::query_as::<_, ItemRow>(
                r#"
                SELECT * FROM items
                WHERE user_name = ? AND page_name = ?
                ORDER BY last_modification_date DESC, item_id
                LIMIT ?
                "#,
            )
            .bind(user_name)
            .bind(page_name)
            .bind(i64::from(limit))
            .fetch_all(&mut *self.tx)
            .await?;
            rows.into_iter().map(Item::try_from).collect()
        }

        async fn delete_items_from_page(
            &mut self,
            user_name: &str,
            page_name: &str,
        ) -> MetadataResult<u64> {
            let result = sqlx::query("DELETE FROM items WHERE user_name = ? AND page_name = ?")
                .bind(user_name)
                .bind(page_name)
                .execute(&mut *self.tx)
                .await?;
            Ok(result.rows_affected())
        }

        async fn find_item(
            &mut self,
            user_name: &str,
            page_name: &str,
            id: &str,
        ) -> MetadataResult<bool> {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM items WHERE user_name = ? AND page_name = ? AND item_id = ?)",
            )
            .bind(user_name)
            .bind(page_name)
            .bind(id)
            .fetch_one(&mut *self.tx)
            .await?;
            Ok(exists)
        }

        async fn get_item(
            &mut self,
            user_name: &str,
            page_name: &str,
            id: &str,
        ) -> MetadataResult<Item> {
            let row = sqlx::query_as::<_, ItemRow>(
                "SELECT * FROM items WHERE user_name = ? AND page_name = ? AND item_id = ?",
            )
            .bind(user_name)
            .bind(page_name)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| {
                MetadataError::not_found("item", format!("{}/{id}", page_key(user_name, page_name)))
            })?;
            row.try_into()
        }

        async fn store_item(
            &mut self,
            user_name: &str,
            page_name: &str,
            item: &Item,
        ) -> MetadataResult<()> {
            let row = ItemRow::new(user_name, page_name, item)?;
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO items (
                    user_name, page_name, item_id, kind, title, content, html_content,
                    source, url, creation_date, last_modification_date, tags
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&row.user_name)
            .bind(&row.page_name)
            .bind(&row.item_id)
            .bind(&row.kind)
            .bind(&row.title)
            .bind(&row.content)
            .bind(&row.html_content)
            .bind(&row.source)
            .bind(&row.url)
            .bind(row.creation_date)
            .bind(row.last_modification_date)
            .bind(&row.tags)
            .execute(&mut *self.tx)
            .await?;
            Ok(())
        }

        async fn delete_item(
            &mut self,
            user_name: &str,
            page_name: &str,
            id: &str,
        ) -> MetadataResult<()> {
            sqlx::query("DELETE FROM items WHERE user_name = ? AND page_name = ? AND item_id = ?")
                .bind(user_name)
                .bind(page_name)
                .bind(id)
                .execute(&mut *self.tx)
                .await?;
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepo for SqliteTransaction {
        async fn find_user(&mut self, name: &str) -> MetadataResult<bool> {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE name = ?)")
                    .bind(name)
                    .fetch_one(&mut *self.tx)
                    .await?;
            Ok(exists)
        }

        async fn get_user_by_name(&mut self, name: &str) -> MetadataResult<User> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE name = ?")
                .bind(name)
                .fetch_optional(&mut *self.tx)
                .await?
                .ok_or_else(|| MetadataError::not_found("user", name))?;
            row.try_into()
        }

        async fn get_identity(&mut self, ident: &Ident) -> MetadataResult<Identity> {
            let row = sqlx::query_as::<_, IdentityRow>(
                "SELECT * FROM identities WHERE provider = ? AND external_id = ?",
            )
            .bind(&ident.provider)
            .bind(&ident.external_id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| MetadataError::not_found("identity", ident))?;
            Ok(row.into())
        }

        async fn store_user(&mut self, user: &User) -> MetadataResult<()> {
            let row = UserRow::from(user);
            sqlx::query("INSERT OR REPLACE INTO users (name, kind, full_name) VALUES (?, ?, ?)")
                .bind(&row.name)
                .bind(&row.kind)
                .bind(&row.full_name)
                .execute(&mut *self.tx)
                .await?;
            Ok(())
        }

        async fn store_identity(&mut self, identity: &Identity) -> MetadataResult<()> {
            sqlx::query(
                "INSERT OR REPLACE INTO identities (provider, external_id, user_name) VALUES (?, ?, ?)",
            )
            .bind(&identity.ident.provider)
            .bind(&identity.ident.external_id)
            .bind(&identity.user_name)
            .execute(&mut *self.tx)
            .await?;
            Ok(())
        }
    }

    #[async_trait]
    impl ImageRepo for SqliteTransaction {
        async fn get_images(
            &mut self,
            user_name: &str,
            limit: u32,
        ) -> MetadataResult<Vec<UploadInfo>> {
            let rows = sqlx::query_as::<_, UploadRow>(
                "SELECT * FROM uploads WHERE user_name = ? ORDER BY filename, image_id LIMIT ?",
            )
            .bind(user_name)
            .bind(i64::from(limit))
            .fetch_all(&mut *self.tx)
            .await?;
            rows.into_iter().map(UploadInfo::try_from).collect()
        }

        async fn get_image(&mut self, user_name: &str, id: &str) -> MetadataResult<UploadInfo> {
            let row = sqlx::query_as::<_, UploadRow>(
                "SELECT * FROM uploads WHERE user_name = ? AND image_id = ?",
            )
            .bind(user_name)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| MetadataError::not_found("image", format!("{user_name}/{id}")))?;
            row.try_into()
        }

        async fn store_image(&mut self, user_name: &str, upload: &UploadInfo) -> MetadataResult<()> {
            let row = UploadRow::new(user_name, upload)?;
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO uploads (
                    user_name, image_id, content_type, creation_time, filename, size
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&row.user_name)
            .bind(&row.image_id)
            .bind(&row.content_type)
            .bind(row.creation_time)
            .bind(&row.filename)
            .bind(row.size)
            .execute(&mut *self.tx)
            .await?;
            Ok(())
        }

        async fn delete_image(&mut self, user_name: &str, id: &str) -> MetadataResult<()> {
            sqlx::query("DELETE FROM uploads WHERE user_name = ? AND image_id = ?")
                .bind(user_name)
                .bind(id)
                .execute(&mut *self.tx)
                .await?;
            Ok(())
        }
    }

    #[async_trait]
    impl UsageRepo for SqliteTransaction {
        async fn is_used(&mut self, image_id: &str) -> MetadataResult<bool> {
            let used: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM usages WHERE image_id = ?)")
                    .bind(image_id)
                    .fetch_one(&mut *self.tx)
                    .await?;
            Ok(used)
        }

        async fn get_usage(
            &mut self,
            user_name: &str,
            page_name: &str,
            image_id: &str,
        ) -> MetadataResult<Usage> {
            let row = sqlx::query_as::<_, UsageRow>(
                "SELECT * FROM usages WHERE user_name = ? AND page_name = ? AND image_id = ?",
            )
            .bind(user_name)
            .bind(page_name)
            .bind(image_id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| {
                MetadataError::not_found(
                    "usage",
                    format!("{}/{image_id}", page_key(user_name, page_name)),
                )
            })?;
            Ok(row.into())
        }

        async fn get_usages(
            &mut self,
            user_name: &str,
            page_name: &str,
        ) -> MetadataResult<Vec<Usage>> {
            let rows = sqlx::query_as::<_, UsageRow>(
                "SELECT * FROM usages WHERE user_name = ? AND page_name = ? ORDER BY image_id",
            )
            .bind(user_name)
            .bind(page_name)
            .fetch_all(&mut *self.tx)
            .await?;
            Ok(rows.into_iter().map(Usage::from).collect())
        }

        async fn store_usage(&mut self, usage: &Usage) -> MetadataResult<()> {
            sqlx::query(
                "INSERT OR REPLACE INTO usages (user_name, page_name, image_id) VALUES (?, ?, ?)",
            )
            .bind(&usage.user_name)
            .bind(&usage.page_name)
            .bind(&usage.image_id)
            .execute(&mut *self.tx)
            .await?;
            Ok(())
        }

        async fn delete_usage(
            &mut self,
            user_name: &str,
            page_name: &str,
            image_id: &str,
        ) -> MetadataResult<()> {
            sqlx::query(
                "DELETE FROM usages WHERE user_name = ? AND page_name = ? AND image_id = ?",
            )
            .bind(user_name)
            .bind(page_name)
            .bind(image_id)
            .execute(&mut *self.tx)
            .await?;
            Ok(())
        }

        async fn delete_usages(&mut self, user_name: &str, page_name: &str) -> MetadataResult<u64> {
            let result = sqlx::query("DELETE FROM usages WHERE user_name = ? AND page_name = ?")
                .bind(user_name)
                .bind(page_name)
                .execute(&mut *self.tx)
                .await?;
            Ok(result.rows_affected())
        }
    }

    #[async_trait]
    impl TemplateRepo for SqliteTransaction {
        async fn get_template(&mut self, id: &str) -> MetadataResult<Template> {
            let row = sqlx::query_as::<_, TemplateRow>(
                "SELECT * FROM templates WHERE template_id = ?",
            )
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| MetadataError::not_found("template", id))?;
            row.try_into()
        }

        async fn find_template(&mut self, id: &str) -> MetadataResult<bool> {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM templates WHERE template_id = ?)")
                    .bind(id)
                    .fetch_one(&mut *self.tx)
                    .await?;
            Ok(exists)
        }

        async fn get_all_templates(&mut self) -> MetadataResult<Vec<Template>> {
            let rows = sqlx::query_as::<_, TemplateRow>(
                "SELECT * FROM templates ORDER BY name, template_id",
            )
            .fetch_all(&mut *self.tx)
            .await?;
            rows.into_iter().map(Template::try_from).collect()
        }

        async fn put_template(&mut self, template: &Template) -> MetadataResult<()> {
            let row = TemplateRow::try_from(template)?;
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO templates (
                    template_id, name, file, page_tags, item_tags,
                    creation_date, last_modification_date
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&row.template_id)
            .bind(&row.name)
            .bind(&row.file)
            .bind(&row.page_tags)
            .bind(&row.item_tags)
            .bind(row.creation_date)
            .bind(row.last_modification_date)
            .execute(&mut *self.tx)
            .await?;
            Ok(())
        }

        async fn delete_template(&mut self, id: &str) -> MetadataResult<()> {
            sqlx::query("DELETE FROM templates WHERE template_id = ?")
                .bind(id)
                .execute(&mut *self.tx)
                .await?;
            Ok(())
        }
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    name TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    full_name TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS identities (
    provider TEXT NOT NULL,
    external_id TEXT NOT NULL,
    user_name TEXT NOT NULL,
    PRIMARY KEY (provider, external_id)
);
CREATE INDEX IF NOT EXISTS idx_identities_user ON identities(user_name);

CREATE TABLE IF NOT EXISTS pages (
    user_name TEXT NOT NULL,
    name TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    content_license TEXT NOT NULL DEFAULT '',
    policy TEXT NOT NULL,
    template_id TEXT NOT NULL DEFAULT '',
    creation_date TEXT NOT NULL,
    last_modification_date TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    PRIMARY KEY (user_name, name)
);
CREATE INDEX IF NOT EXISTS idx_pages_user_modified ON pages(user_name, last_modification_date);
CREATE INDEX IF NOT EXISTS idx_pages_policy_modified ON pages(policy, last_modification_date);

CREATE TABLE IF NOT EXISTS items (
    user_name TEXT NOT NULL,
    page_name TEXT NOT NULL,
    item_id TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    html_content TEXT NOT NULL DEFAULT '',
    source TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL DEFAULT '',
    creation_date TEXT NOT NULL,
    last_modification_date TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    PRIMARY KEY (user_name, page_name, item_id)
);
CREATE INDEX IF NOT EXISTS idx_items_page_modified ON items(user_name, page_name, last_modification_date);

CREATE TABLE IF NOT EXISTS usages (
    user_name TEXT NOT NULL,
    page_name TEXT NOT NULL,
    image_id TEXT NOT NULL,
    PRIMARY KEY (user_name, page_name, image_id)
);
CREATE INDEX IF NOT EXISTS idx_usages_image ON usages(image_id);

CREATE TABLE IF NOT EXISTS uploads (
    user_name TEXT NOT NULL,
    image_id TEXT NOT NULL,
    content_type TEXT NOT NULL DEFAULT '',
    creation_time TEXT NOT NULL,
    filename TEXT NOT NULL DEFAULT '',
    size INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (user_name, image_id)
);
CREATE INDEX IF NOT EXISTS idx_uploads_user_filename ON uploads(user_name, filename);

CREATE TABLE IF NOT EXISTS templates (
    template_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    file TEXT NOT NULL,
    page_tags TEXT NOT NULL DEFAULT '[]',
    item_tags TEXT NOT NULL DEFAULT '[]',
    creation_date TEXT NOT NULL,
    last_modification_date TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_templates_name ON templates(name);
"#;
