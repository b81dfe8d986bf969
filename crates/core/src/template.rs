//! Page templates and their tag schemas.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Describes one tag key that a template cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDescription {
    pub key: String,
    #[serde(default)]
    pub name: String,
    /// Value kind, e.g. `"imageId"` for tags that reference an upload.
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_value: String,
}

impl TagDescription {
    /// Description with only a key and a default value.
    pub fn new(key: impl Into<String>, default_value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default_value: default_value.into(),
            ..Default::default()
        }
    }

    /// Set the value kind.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Whether tag values under this key reference uploaded images.
    pub fn is_image_id(&self) -> bool {
        self.kind == crate::IMAGE_ID_KIND
    }
}

/// Ordered list of tag descriptions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagDescriptionList(Vec<TagDescription>);

impl TagDescriptionList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagDescription> {
        self.0.iter()
    }

    /// Look up a description by key.
    pub fn get(&self, key: &str) -> Option<&TagDescription> {
        self.0.iter().find(|d| d.key == key)
    }

    /// Descriptions whose values are image ids.
    pub fn image_ids(&self) -> impl Iterator<Item = &TagDescription> {
        self.0.iter().filter(|d| d.is_image_id())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<TagDescription>> for TagDescriptionList {
    fn from(descriptions: Vec<TagDescription>) -> Self {
        Self(descriptions)
    }
}

/// A global page template.
///
/// Templates are shared by every user. `page_tags` and `item_tags` act as a
/// schema for the tags of pages and items rendered with the template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Identifier; empty until first stored.
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Rendering target reference.
    pub file: String,
    #[serde(default)]
    pub page_tags: TagDescriptionList,
    #[serde(default)]
    pub item_tags: TagDescriptionList,
    #[serde(default = "crate::now", with = "time::serde::rfc3339")]
    pub creation_date: OffsetDateTime,
    #[serde(default = "crate::now", with = "time::serde::rfc3339")]
    pub last_modification_date: OffsetDateTime,
}

impl Template {
    /// New unsaved template stamped with the current time.
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        let now = crate::now();
        Self {
            id: String::new(),
            name: name.into(),
            file: file.into(),
            page_tags: TagDescriptionList::new(),
            item_tags: TagDescriptionList::new(),
            creation_date: now,
            last_modification_date: now,
        }
    }
}
