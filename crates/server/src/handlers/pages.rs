//! Page endpoints.

use super::ListParams;
use crate::auth::Caller;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use leaflet_app::{ImportSummary, PageExport};
use leaflet_core::Page;
use leaflet_metadata::PageSet;
use serde::Deserialize;

/// GET /v1/pages - The caller's pages.
pub async fn list_owned_pages(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PageSet>> {
    let limit = state.list_limit(params.limit);
    Ok(Json(state.app(&caller).list_owned_pages(limit).await?))
}

/// GET /v1/pages/public - Public pages of every user.
pub async fn list_public_pages(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<PageSet>> {
    let limit = state.list_limit(params.limit);
    Ok(Json(state.app(&caller).list_public_pages(limit).await?))
}

/// POST /v1/pages
pub async fn create_page(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(page): Json<Page>,
) -> ApiResult<(StatusCode, Json<Page>)> {
    let page = state.app(&caller).create_page(page).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// GET /v1/users/{user}/pages/{page} - Template defaults are filled in.
pub async fn get_page(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name)): Path<(String, String)>,
) -> ApiResult<Json<Page>> {
    Ok(Json(
        state
            .app(&caller)
            .get_page_with_defaults(&user_name, &page_name)
            .await?,
    ))
}

/// PUT /v1/users/{user}/pages/{page} - Replace a page.
///
/// The key comes from the path. Image usages are rebuilt from the page-tag
/// schema of the page's template.
pub async fn update_page(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name)): Path<(String, String)>,
    Json(mut page): Json<Page>,
) -> ApiResult<Json<Page>> {
    page.user_name = user_name;
    page.name = page_name;

    let app = state.app(&caller);
    let schema = app.page_tag_schema(&page.template_id).await?;
    Ok(Json(app.update_page(page, &schema).await?))
}

/// DELETE /v1/users/{user}/pages/{page}
pub async fn delete_page(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .app(&caller)
        .delete_page(&user_name, &page_name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    #[serde(default)]
    pub template_id: String,
}

/// PUT /v1/users/{user}/pages/{page}/template
pub async fn update_page_template(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name)): Path<(String, String)>,
    Json(req): Json<UpdateTemplateRequest>,
) -> ApiResult<Json<Page>> {
    let page = state
        .app(&caller)
        .update_template(&user_name, &page_name, &req.template_id)
        .await?;
    Ok(Json(page))
}

/// GET /v1/users/{user}/pages/{page}/export
pub async fn export_page(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name)): Path<(String, String)>,
) -> ApiResult<Json<PageExport>> {
    Ok(Json(
        state
            .app(&caller)
            .export_page(&user_name, &page_name)
            .await?,
    ))
}

/// POST /v1/users/{user}/pages/{page}/export - Import a previous export.
pub async fn import_page(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name)): Path<(String, String)>,
    Json(export): Json<PageExport>,
) -> ApiResult<Json<ImportSummary>> {
    Ok(Json(
        state
            .app(&caller)
            .import_page(&user_name, &page_name, export)
            .await?,
    ))
}
