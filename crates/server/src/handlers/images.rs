//! Uploaded image endpoints.

use super::ListParams;
use crate::auth::Caller;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use leaflet_core::UploadInfo;
use serde::{Deserialize, Serialize};

/// GET /v1/images - The caller's uploads.
pub async fn list_images(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<UploadInfo>>> {
    let limit = state.list_limit(params.limit);
    Ok(Json(state.app(&caller).images(limit).await?))
}

/// POST /v1/images - Record a finished upload.
///
/// The blob service calls this back with the caller's identity headers once
/// the file is stored.
pub async fn store_image(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(upload): Json<UploadInfo>,
) -> ApiResult<(StatusCode, Json<UploadInfo>)> {
    let upload = state.app(&caller).store_image(upload).await?;
    Ok((StatusCode::CREATED, Json(upload)))
}

#[derive(Debug, Deserialize)]
pub struct UploadUrlParams {
    pub destination: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub url: String,
}

/// GET /v1/images/upload-url?destination=
pub async fn upload_url(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<UploadUrlParams>,
) -> ApiResult<Json<UrlResponse>> {
    let destination = params.destination.as_deref().unwrap_or("/v1/images");
    if !destination.starts_with('/') {
        return Err(ApiError::BadRequest(
            "destination must be an absolute path".to_string(),
        ));
    }
    let url = state.app(&caller).upload_url(destination).await?;
    Ok(Json(UrlResponse { url }))
}

#[derive(Debug, Deserialize)]
pub struct ImageUrlParams {
    #[serde(default)]
    pub secure: bool,
    pub size: Option<u32>,
}

/// GET /v1/images/{id}/url - Serving URL of an image, open to anyone.
pub async fn image_url(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Query(params): Query<ImageUrlParams>,
) -> ApiResult<Json<UrlResponse>> {
    let url = state
        .app(&caller)
        .image_url(&id, params.secure, params.size)?;
    Ok(Json(UrlResponse { url }))
}

#[derive(Debug, Deserialize)]
pub struct RenameImageRequest {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct RenameImageResponse {
    pub changed: bool,
}

/// PUT /v1/images/{id} - Rename an image.
pub async fn rename_image(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(req): Json<RenameImageRequest>,
) -> ApiResult<Json<RenameImageResponse>> {
    let changed = state
        .app(&caller)
        .rename_image(&id, &req.filename)
        .await?;
    Ok(Json(RenameImageResponse { changed }))
}

/// DELETE /v1/images/{id}
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.app(&caller).delete_image(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
