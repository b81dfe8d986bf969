//! Identity and account endpoints.

use crate::auth::Caller;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use leaflet_app::AppError;
use leaflet_core::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct WhoamiParams {
    /// Path the login and logout pages should send the browser back to.
    #[serde(rename = "return")]
    pub return_path: Option<String>,
}

/// Response describing the caller.
#[derive(Debug, Serialize)]
pub struct WhoamiResponse {
    /// The caller's account, when they have one.
    pub user: Option<User>,
    /// External identity reported by the proxy, as `provider:subject`.
    pub ident: Option<String>,
    /// Signed in but no account created yet.
    pub first_login: bool,
    pub is_admin: bool,
    pub login_url: String,
    pub logout_url: String,
}

/// GET /v1/auth/whoami - Return the caller's account or first-login state.
pub async fn whoami(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<WhoamiParams>,
) -> ApiResult<Json<WhoamiResponse>> {
    let app = state.app(&caller);
    let return_path = params.return_path.as_deref().unwrap_or("/");

    let (user, first_login) = match app.current_user().await {
        Ok(user) => (Some(user), false),
        Err(AppError::NotAuthorized { .. }) => (None, false),
        Err(AppError::FirstLoginPending { .. }) => (None, true),
        Err(e) => return Err(e.into()),
    };

    Ok(Json(WhoamiResponse {
        user,
        ident: caller.ident().map(|ident| ident.to_string()),
        first_login,
        is_admin: app.current_user_is_admin(),
        login_url: app.login_url(return_path),
        logout_url: app.logout_url(return_path),
    }))
}

/// Request to create the caller's account.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
}

/// POST /v1/users - Create an account for the signed-in identity.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let ident = caller
        .ident()
        .ok_or_else(|| ApiError::Unauthorized("sign in before creating an account".to_string()))?;
    let user = state.app(&caller).create_user(ident, &req.name).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
