//! Route configuration.

use crate::auth::identity_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let page = "/v1/users/{user}/pages/{page}";

    Router::new()
        .route("/v1/health", get(handlers::health_check))
        .route("/v1/version", get(handlers::version))
        .route("/v1/auth/whoami", get(handlers::whoami))
        .route("/v1/users", post(handlers::create_user))
        // Pages
        .route(
            "/v1/pages",
            get(handlers::list_owned_pages).post(handlers::create_page),
        )
        .route("/v1/pages/public", get(handlers::list_public_pages))
        .route(
            page,
            get(handlers::get_page)
                .put(handlers::update_page)
                .delete(handlers::delete_page),
        )
        .route(
            &format!("{page}/template"),
            put(handlers::update_page_template),
        )
        .route(
            &format!("{page}/export"),
            get(handlers::export_page).post(handlers::import_page),
        )
        // Items
        .route(
            &format!("{page}/items"),
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            &format!("{page}/items/{{item}}"),
            get(handlers::get_item)
                .post(handlers::update_item)
                .put(handlers::put_item)
                .delete(handlers::delete_item),
        )
        .route(
            &format!("{page}/items/{{item}}/tags/{{key}}"),
            put(handlers::set_item_tag),
        )
        // Templates
        .route(
            "/v1/templates",
            get(handlers::list_templates).post(handlers::store_template),
        )
        .route(
            "/v1/templates/{id}",
            get(handlers::get_template).delete(handlers::delete_template),
        )
        // Images
        .route(
            "/v1/images",
            get(handlers::list_images).post(handlers::store_image),
        )
        .route("/v1/images/upload-url", get(handlers::upload_url))
        .route(
            "/v1/images/{id}",
            put(handlers::rename_image).delete(handlers::delete_image),
        )
        .route("/v1/images/{id}/url", get(handlers::image_url))
        // Identity is resolved before any handler runs
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
