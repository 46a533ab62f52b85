use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query},
};

use workhub_core::access::{self, AccessLevel, ModuleId};
use workhub_core::AppError;
use workhub_models::ModuleResponse;

use crate::middleware::auth::CurrentUser;

use super::model::{MeResponse, ModuleCheckParams, ModuleCheckResponse, MyAccessResponse};
use super::service::AccessService;

#[utoipa::path(
    get,
    path = "/api/modules",
    responses(
        (status = 200, description = "Static module table", body = Vec<ModuleResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Access",
    security(("bearer_auth" = []))
)]
pub async fn list_modules(_current: CurrentUser) -> Json<Vec<ModuleResponse>> {
    Json(access::MODULES.iter().map(Into::into).collect())
}

#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user and effective access", body = MeResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Access",
    security(("bearer_auth" = []))
)]
pub async fn get_me(current: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: current.user,
        access: current.access,
    })
}

#[utoipa::path(
    get,
    path = "/api/me/access",
    responses(
        (status = 200, description = "Level on every module", body = MyAccessResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Access",
    security(("bearer_auth" = []))
)]
pub async fn get_my_access(current: CurrentUser) -> Json<MyAccessResponse> {
    Json(MyAccessResponse::from(&current.access))
}

#[utoipa::path(
    get,
    path = "/api/me/access/{module}",
    params(
        ("module" = String, Path, description = "Module id"),
        ModuleCheckParams
    ),
    responses(
        (status = 200, description = "Access check result", body = ModuleCheckResponse),
        (status = 400, description = "Unknown module"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Access",
    security(("bearer_auth" = []))
)]
pub async fn check_my_access(
    current: CurrentUser,
    Path(module): Path<String>,
    Query(params): Query<ModuleCheckParams>,
) -> Result<Json<ModuleCheckResponse>, AppError> {
    let module: ModuleId = module.parse().map_err(|e: String| AppError::bad_request(anyhow!(e)))?;
    let required = params.required.unwrap_or(AccessLevel::View);

    Ok(Json(AccessService::check_module(
        &current.access,
        module,
        required,
    )))
}
