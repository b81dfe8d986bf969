//! Page queries.
//!
//! A [`PageQuery`] is a plain value describing ancestor scoping, equality
//! filters, one sort key and a limit. Backends translate it into their own
//! query language and hand the raw rows back to [`PageQuery::paginate`].

use leaflet_core::{Page, Policy};
use serde::Serialize;

/// Equality filter on a page attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageFilter {
    Policy(Policy),
    TemplateId(String),
    Name(String),
    Title(String),
    ContentLicense(String),
}

impl PageFilter {
    /// Column the filter applies to.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Policy(_) => "policy",
            Self::TemplateId(_) => "template_id",
            Self::Name(_) => "name",
            Self::Title(_) => "title",
            Self::ContentLicense(_) => "content_license",
        }
    }

    /// Value compared against the column.
    pub fn value(&self) -> &str {
        match self {
            Self::Policy(policy) => policy.as_str(),
            Self::TemplateId(v) | Self::Name(v) | Self::Title(v) | Self::ContentLicense(v) => v,
        }
    }
}

/// Sortable page attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageOrderField {
    Name,
    Title,
    CreationDate,
    LastModificationDate,
}

impl PageOrderField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Title => "title",
            Self::CreationDate => "creation_date",
            Self::LastModificationDate => "last_modification_date",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Page query builder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageQuery {
    user_name: Option<String>,
    filters: Vec<PageFilter>,
    order: Option<(PageOrderField, SortDirection)>,
    limit: Option<u32>,
}

impl PageQuery {
    /// Query over every page of every user.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to pages owned by `user_name`.
    pub fn user(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// Add an equality filter. Filters are combined with AND.
    pub fn filter(mut self, filter: PageFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sort by a single field, replacing any previous ordering.
    pub fn order(mut self, field: PageOrderField, direction: SortDirection) -> Self {
        self.order = Some((field, direction));
        self
    }

    /// Return at most `limit` pages and report whether more exist. Zero means
    /// no limit.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn filters(&self) -> &[PageFilter] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<(PageOrderField, SortDirection)> {
        self.order
    }

    /// Number of rows a backend should fetch: one past the limit, so that
    /// `paginate` can tell whether more rows exist. A zero limit fetches
    /// everything.
    pub fn fetch_limit(&self) -> Option<u32> {
        self.limit
            .filter(|&limit| limit > 0)
            .map(|limit| limit.saturating_add(1))
    }

    /// Truncate fetched rows to the limit and compute `has_more`.
    pub fn paginate(&self, mut pages: Vec<Page>) -> PageSet {
        match self.limit {
            Some(limit) if limit > 0 && pages.len() > limit as usize => {
                pages.truncate(limit as usize);
                PageSet {
                    pages,
                    has_more: true,
                }
            }
            _ => PageSet {
                pages,
                has_more: false,
            },
        }
    }
}

/// Result of a page query.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PageSet {
    pub pages: Vec<Page>,
    pub has_more: bool,
}
