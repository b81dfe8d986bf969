//! HTTP request handlers.

pub mod health;
pub mod images;
pub mod items;
pub mod pages;
pub mod templates;
pub mod users;

pub use health::*;
pub use images::*;
pub use items::*;
pub use pages::*;
pub use templates::*;
pub use users::*;

use serde::Deserialize;

/// `?limit=` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}
