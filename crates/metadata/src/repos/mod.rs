//! Repository traits for metadata operations.
//!
//! Every trait takes `&mut self`: implementations are transactional views
//! handed out by a [`crate::Datastore`], not the store itself.

pub mod images;
pub mod items;
pub mod pages;
pub mod templates;
pub mod usages;
pub mod users;

pub use images::ImageRepo;
pub use items::ItemRepo;
pub use pages::PageRepo;
pub use templates::TemplateRepo;
pub use usages::UsageRepo;
pub use users::UserRepo;

/// Every repository operation, as seen from inside a transaction.
pub trait Repository:
    PageRepo + ItemRepo + UserRepo + ImageRepo + UsageRepo + TemplateRepo + Send
{
}

impl<T> Repository for T where
    T: PageRepo + ItemRepo + UserRepo + ImageRepo + UsageRepo + TemplateRepo + Send + ?Sized
{
}
