//! Page items.

use crate::tags::TagList;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One entry on a page, keyed by `(user_name, page_name, id)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Random identifier, unique within the parent page. Empty until created.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    /// Markdown source.
    #[serde(default)]
    pub content: String,
    /// Sanitized HTML rendered from `content`; always derived on write.
    #[serde(default)]
    pub html_content: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "crate::now", with = "time::serde::rfc3339")]
    pub creation_date: OffsetDateTime,
    #[serde(default = "crate::now", with = "time::serde::rfc3339")]
    pub last_modification_date: OffsetDateTime,
    #[serde(default)]
    pub tags: TagList,
}

impl Item {
    /// New item stamped with the current time.
    pub fn new(content: impl Into<String>) -> Self {
        let now = crate::now();
        Self {
            id: String::new(),
            kind: String::new(),
            title: String::new(),
            content: content.into(),
            html_content: String::new(),
            source: String::new(),
            url: String::new(),
            creation_date: now,
            last_modification_date: now,
            tags: TagList::new(),
        }
    }

    /// An item must carry markdown content or a url.
    pub fn has_body(&self) -> bool {
        !self.content.is_empty() || !self.url.is_empty()
    }
}
