//! Core domain types and shared logic for Leaflet.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Users and their external identities
//! - Pages and their items
//! - Ordered tag lists and template tag schemas
//! - Uploaded images and page-to-image usage records
//! - Random identifier generation

pub mod config;
pub mod error;
pub mod id;
pub mod item;
pub mod page;
pub mod tags;
pub mod template;
pub mod upload;
pub mod user;

pub use error::{Error, Result};
pub use id::{IdGenerator, RandomIdGenerator};
pub use item::Item;
pub use page::{Page, Policy};
pub use tags::{Tag, TagList};
pub use template::{TagDescription, TagDescriptionList, Template};
pub use upload::{UploadInfo, Usage};
pub use user::{Ident, Identity, User, UserKind};

use time::OffsetDateTime;

/// Length of generated item and template identifiers.
pub const ID_LENGTH: usize = 18;

/// Maximum accepted upload size in bytes.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10_000_000;

/// Tag description kind marking a tag whose value is an uploaded image id.
pub const IMAGE_ID_KIND: &str = "imageId";

/// Current UTC time truncated to millisecond precision.
///
/// Every timestamp written by Leaflet goes through this so values compare
/// equal after a round trip through storage.
pub fn now() -> OffsetDateTime {
    truncate_to_millis(OffsetDateTime::now_utc())
}

/// Drop sub-millisecond precision from a timestamp.
pub fn truncate_to_millis(ts: OffsetDateTime) -> OffsetDateTime {
    let nanos = ts.nanosecond();
    ts.replace_nanosecond(nanos - nanos % 1_000_000)
        .unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_truncate_to_millis() {
        let ts = datetime!(2024-03-01 12:00:00.123_456_789 UTC);
        assert_eq!(
            truncate_to_millis(ts),
            datetime!(2024-03-01 12:00:00.123 UTC)
        );
    }

    #[test]
    fn test_now_has_millisecond_precision() {
        assert_eq!(now().nanosecond() % 1_000_000, 0);
    }
}
