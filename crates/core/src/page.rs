//! Pages and their visibility policy.

use crate::tags::TagList;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Who may read a page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Policy {
    /// Only the owner.
    #[default]
    Private,
    /// Anyone, including anonymous callers.
    Public,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "PRIVATE",
            Self::Public => "PUBLIC",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRIVATE" => Ok(Self::Private),
            "PUBLIC" => Ok(Self::Public),
            other => Err(crate::Error::InvalidPolicy(other.to_string())),
        }
    }
}

/// A note page, keyed by `(user_name, name)`.
///
/// `last_modification_date` tracks the latest change to the page itself or
/// to any of its items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Owner; the page key prefix.
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content_license: String,
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub template_id: String,
    #[serde(default = "crate::now", with = "time::serde::rfc3339")]
    pub creation_date: OffsetDateTime,
    #[serde(default = "crate::now", with = "time::serde::rfc3339")]
    pub last_modification_date: OffsetDateTime,
    #[serde(default)]
    pub tags: TagList,
}

impl Page {
    /// New private page stamped with the current time.
    pub fn new(user_name: impl Into<String>, name: impl Into<String>) -> Self {
        let now = crate::now();
        Self {
            user_name: user_name.into(),
            name: name.into(),
            title: String::new(),
            content_license: String::new(),
            policy: Policy::Private,
            template_id: String::new(),
            creation_date: now,
            last_modification_date: now,
            tags: TagList::new(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.policy == Policy::Public
    }

    pub fn is_owned_by(&self, user_name: &str) -> bool {
        self.user_name == user_name
    }
}
