//! Template registry endpoints.

use crate::auth::Caller;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use leaflet_core::Template;
use serde::Serialize;

/// GET /v1/templates
pub async fn list_templates(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> ApiResult<Json<Vec<Template>>> {
    Ok(Json(state.app(&caller).get_all_templates().await?))
}

#[derive(Debug, Serialize)]
pub struct StoreTemplateResponse {
    pub id: String,
}

/// POST /v1/templates - Create or replace a template (admin only).
pub async fn store_template(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(template): Json<Template>,
) -> ApiResult<(StatusCode, Json<StoreTemplateResponse>)> {
    let id = state.app(&caller).store_template(template).await?;
    Ok((StatusCode::CREATED, Json(StoreTemplateResponse { id })))
}

/// GET /v1/templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<Json<Template>> {
    Ok(Json(state.app(&caller).get_template(&id).await?))
}

/// DELETE /v1/templates/{id} - Admin only.
pub async fn delete_template(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.app(&caller).delete_template(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
