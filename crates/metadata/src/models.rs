//! Database rows and their mapping to core domain types.
//!
//! Tag lists and tag description lists are stored as JSON text. Timestamps are
//! normalized to UTC on write so that text ordering in SQLite matches time
//! ordering.

use crate::error::{MetadataError, MetadataResult};
use leaflet_core::{
    Ident, Identity, Item, Page, TagDescriptionList, TagList, Template, UploadInfo, Usage, User,
};
use sqlx::FromRow;
use time::{OffsetDateTime, UtcOffset};

fn utc(ts: OffsetDateTime) -> OffsetDateTime {
    ts.to_offset(UtcOffset::UTC)
}

// =============================================================================
// Users and identities
// =============================================================================

/// User record.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub name: String,
    pub kind: String,
    pub full_name: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            kind: user.kind.as_str().to_string(),
            full_name: user.full_name.clone(),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = MetadataError;

    fn try_from(row: UserRow) -> MetadataResult<Self> {
        Ok(Self {
            kind: row.kind.parse()?,
            name: row.name,
            full_name: row.full_name,
        })
    }
}

/// Identity record linking an external identity to a user name.
#[derive(Debug, Clone, FromRow)]
pub struct IdentityRow {
    pub provider: String,
    pub external_id: String,
    pub user_name: String,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Self {
            ident: Ident::new(row.provider, row.external_id),
            user_name: row.user_name,
        }
    }
}

// =============================================================================
// Pages and items
// =============================================================================

/// Page record, keyed by `(user_name, name)`.
#[derive(Debug, Clone, FromRow)]
pub struct PageRow {
    pub user_name: String,
    pub name: String,
    pub title: String,
    pub content_license: String,
    pub policy: String,
    pub template_id: String,
    pub creation_date: OffsetDateTime,
    pub last_modification_date: OffsetDateTime,
    pub tags: String,
}

impl TryFrom<&Page> for PageRow {
    type Error = MetadataError;

    fn try_from(page: &Page) -> MetadataResult<Self> {
        Ok(Self {
            user_name: page.user_name.clone(),
            name: page.name.clone(),
            title: page.title.clone(),
            content_license: page.content_license.clone(),
            policy: page.policy.as_str().to_string(),
            template_id: page.template_id.clone(),
            creation_date: utc(page.creation_date),
            last_modification_date: utc(page.last_modification_date),
            tags: serde_json::to_string(&page.tags)?,
        })
    }
}

impl TryFrom<PageRow> for Page {
    type Error = MetadataError;

    fn try_from(row: PageRow) -> MetadataResult<Self> {
        Ok(Self {
            policy: row.policy.parse()?,
            tags: serde_json::from_str::<TagList>(&row.tags)?,
            user_name: row.user_name,
            name: row.name,
            title: row.title,
            content_license: row.content_license,
            template_id: row.template_id,
            creation_date: row.creation_date,
            last_modification_date: row.last_modification_date,
        })
    }
}

/// Item record, keyed by `(user_name, page_name, item_id)`.
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub user_name: String,
    pub page_name: String,
    pub item_id: String,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub html_content: String,
    pub source: String,
    pub url: String,
    pub creation_date: OffsetDateTime,
    pub last_modification_date: OffsetDateTime,
    pub tags: String,
}

impl ItemRow {
    pub fn new(user_name: &str, page_name: &str, item: &Item) -> MetadataResult<Self> {
        Ok(Self {
            user_name: user_name.to_string(),
            page_name: page_name.to_string(),
            item_id: item.id.clone(),
            kind: item.kind.clone(),
            title: item.title.clone(),
            content: item.content.clone(),
            html_content: item.html_content.clone(),
            source: item.source.clone(),
            url: item.url.clone(),
            creation_date: utc(item.creation_date),
            last_modification_date: utc(item.last_modification_date),
            tags: serde_json::to_string(&item.tags)?,
        })
    }
}

impl TryFrom<ItemRow> for Item {
    type Error = MetadataError;

    fn try_from(row: ItemRow) -> MetadataResult<Self> {
        Ok(Self {
            tags: serde_json::from_str::<TagList>(&row.tags)?,
            id: row.item_id,
            kind: row.kind,
            title: row.title,
            content: row.content,
            html_content: row.html_content,
            source: row.source,
            url: row.url,
            creation_date: row.creation_date,
            last_modification_date: row.last_modification_date,
        })
    }
}

// =============================================================================
// Images
// =============================================================================

/// Uploaded image record, keyed by `(user_name, image_id)`.
#[derive(Debug, Clone, FromRow)]
pub struct UploadRow {
    pub user_name: String,
    pub image_id: String,
    pub content_type: String,
    pub creation_time: OffsetDateTime,
    pub filename: String,
    pub size: i64,
}

impl UploadRow {
    pub fn new(user_name: &str, upload: &UploadInfo) -> MetadataResult<Self> {
        let size = i64::try_from(upload.size).map_err(|_| {
            MetadataError::Corrupt(format!("upload size {} out of range", upload.size))
        })?;
        Ok(Self {
            user_name: user_name.to_string(),
            image_id: upload.key.clone(),
            content_type: upload.content_type.clone(),
            creation_time: utc(upload.creation_time),
            filename: upload.filename.clone(),
            size,
        })
    }
}

impl TryFrom<UploadRow> for UploadInfo {
    type Error = MetadataError;

    fn try_from(row: UploadRow) -> MetadataResult<Self> {
        let size = u64::try_from(row.size)
            .map_err(|_| MetadataError::Corrupt(format!("negative upload size {}", row.size)))?;
        Ok(Self {
            key: row.image_id,
            content_type: row.content_type,
            creation_time: row.creation_time,
            filename: row.filename,
            size,
        })
    }
}

/// Image usage record, keyed by `(user_name, page_name, image_id)`.
#[derive(Debug, Clone, FromRow)]
pub struct UsageRow {
    pub user_name: String,
    pub page_name: String,
    pub image_id: String,
}

impl From<UsageRow> for Usage {
    fn from(row: UsageRow) -> Self {
        Usage::new(row.user_name, row.page_name, row.image_id)
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Template record.
#[derive(Debug, Clone, FromRow)]
pub struct TemplateRow {
    pub template_id: String,
    pub name: String,
    pub file: String,
    pub page_tags: String,
    pub item_tags: String,
    pub creation_date: OffsetDateTime,
    pub last_modification_date: OffsetDateTime,
}

impl TryFrom<&Template> for TemplateRow {
    type Error = MetadataError;

    fn try_from(template: &Template) -> MetadataResult<Self> {
        Ok(Self {
            template_id: template.id.clone(),
            name: template.name.clone(),
            file: template.file.clone(),
            page_tags: serde_json::to_string(&template.page_tags)?,
            item_tags: serde_json::to_string(&template.item_tags)?,
            creation_date: utc(template.creation_date),
            last_modification_date: utc(template.last_modification_date),
        })
    }
}

impl TryFrom<TemplateRow> for Template {
    type Error = MetadataError;

    fn try_from(row: TemplateRow) -> MetadataResult<Self> {
        Ok(Self {
            page_tags: serde_json::from_str::<TagDescriptionList>(&row.page_tags)?,
            item_tags: serde_json::from_str::<TagDescriptionList>(&row.item_tags)?,
            id: row.template_id,
            name: row.name,
            file: row.file,
            creation_date: row.creation_date,
            last_modification_date: row.last_modification_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leaflet_core::Policy;
    use time::macros::{datetime, offset};

    #[test]
    fn test_page_row_normalizes_to_utc() {
        let mut page = Page::new("alice", "blog");
        page.last_modification_date = datetime!(2024-01-01 10:00 +02:00);
        let row = PageRow::try_from(&page).unwrap();
        assert_eq!(row.last_modification_date.offset(), offset!(UTC));
        assert_eq!(row.last_modification_date, page.last_modification_date);
    }

    #[test]
    fn test_page_row_rejects_unknown_policy() {
        let mut row = PageRow::try_from(&Page::new("alice", "blog")).unwrap();
        row.policy = "FRIENDS".to_string();
        assert!(matches!(
            Page::try_from(row),
            Err(MetadataError::Corrupt(_))
        ));
    }

    #[test]
    fn test_page_row_keeps_tags() {
        let mut page = Page::new("alice", "blog");
        page.policy = Policy::Public;
        page.tags.set_tag("cover", "img1");
        let row = PageRow::try_from(&page).unwrap();
        let back = Page::try_from(row).unwrap();
        assert_eq!(back.tags.tag("cover"), Some("img1"));
        assert!(back.is_public());
    }

    #[test]
    fn test_upload_row_rejects_negative_size() {
        let row = UploadRow {
            user_name: "alice".to_string(),
            image_id: "img".to_string(),
            content_type: "image/png".to_string(),
            creation_time: leaflet_core::now(),
            filename: "a.png".to_string(),
            size: -1,
        };
        assert!(UploadInfo::try_from(row).is_err());
    }
}
