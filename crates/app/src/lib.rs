//! Use-case orchestration for Leaflet.
//!
//! [`App`] authorizes every operation against the caller's identity, runs the
//! repository transactions and keeps derived records (image usages, page
//! modification dates, rendered item HTML) consistent.

pub mod app;
pub mod error;
pub mod images;
pub mod items;
pub mod markdown;
pub mod pages;
pub mod providers;
pub mod templates;
pub mod transfer;
pub mod users;

pub use app::{App, AppServices};
pub use error::{AppError, AppResult, ProviderError};
pub use markdown::{MarkdownRenderer, SanitizedMarkdown};
pub use providers::{IdentityProvider, UploadProvider};
pub use transfer::{EXPORT_ITEM_LIMIT, ImportSummary, PageExport};
pub use users::is_valid_user_name;
