//! HTTP API server for Leaflet.
//!
//! This crate provides the JSON API over the use cases in `leaflet-app`:
//! - Caller identity from trusted reverse-proxy headers
//! - Page, item, template and image endpoints
//! - The blob service client for image uploads

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod uploads;

pub use auth::{Caller, HeaderIdentityProvider, TraceId};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use uploads::BlobServiceUploads;
