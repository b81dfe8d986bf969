//! Item endpoints.

use super::ListParams;
use crate::auth::Caller;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use leaflet_core::Item;
use serde::Deserialize;

/// GET /v1/users/{user}/pages/{page}/items - Template defaults are filled in.
pub async fn list_items(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Item>>> {
    let limit = state.list_limit(params.limit);
    let items = state
        .app(&caller)
        .list_items_with_defaults(&user_name, &page_name, limit)
        .await?;
    Ok(Json(items))
}

/// POST /v1/users/{user}/pages/{page}/items - Create an item under a new id.
pub async fn create_item(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name)): Path<(String, String)>,
    Json(item): Json<Item>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let item = state
        .app(&caller)
        .create_item(&user_name, &page_name, item)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /v1/users/{user}/pages/{page}/items/{item}
pub async fn get_item(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name, id)): Path<(String, String, String)>,
) -> ApiResult<Json<Item>> {
    let item = state
        .app(&caller)
        .get_item(&user_name, &page_name, &id)
        .await?;
    Ok(Json(item))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemParams {
    /// Replace the stored tags with the request's; defaults to true.
    pub update_tags: Option<bool>,
}

/// POST /v1/users/{user}/pages/{page}/items/{item} - Update an existing item.
pub async fn update_item(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name, id)): Path<(String, String, String)>,
    Query(params): Query<UpdateItemParams>,
    Json(mut item): Json<Item>,
) -> ApiResult<Json<Item>> {
    item.id = id;
    let item = state
        .app(&caller)
        .update_item(
            &user_name,
            &page_name,
            item,
            params.update_tags.unwrap_or(true),
        )
        .await?;
    Ok(Json(item))
}

/// PUT /v1/users/{user}/pages/{page}/items/{item} - Store an item as given.
pub async fn put_item(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name, id)): Path<(String, String, String)>,
    Json(mut item): Json<Item>,
) -> ApiResult<Json<Item>> {
    item.id = id;
    let item = state
        .app(&caller)
        .put_item(&user_name, &page_name, item)
        .await?;
    Ok(Json(item))
}

/// DELETE /v1/users/{user}/pages/{page}/items/{item}
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name, id)): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    state
        .app(&caller)
        .delete_item(&user_name, &page_name, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SetTagRequest {
    #[serde(default)]
    pub value: String,
}

/// PUT /v1/users/{user}/pages/{page}/items/{item}/tags/{key}
pub async fn set_item_tag(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path((user_name, page_name, id, key)): Path<(String, String, String, String)>,
    Json(req): Json<SetTagRequest>,
) -> ApiResult<Json<Item>> {
    let item = state
        .app(&caller)
        .set_item_tag(&user_name, &page_name, &id, &key, &req.value)
        .await?;
    Ok(Json(item))
}
