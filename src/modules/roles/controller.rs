use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use workhub_core::{AppError, ModuleId};
use workhub_models::{
    AccessMatrixResponse, CreateRoleDto, PaginatedRolesResponse, RecountReport, Role, RoleCount,
    RoleFilterParams, SetModuleAccessDto, UpdateRoleDto,
};

use crate::middleware::auth::{RequireRolesAdmin, RequireRolesView};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::RoleService;

#[utoipa::path(
    get,
    path = "/api/admin/roles",
    params(
        ("is_system" = Option<bool>, Query, description = "Filter system roles"),
        ("is_default" = Option<bool>, Query, description = "Filter the default role"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100)"),
        ("offset" = Option<i64>, Query, description = "Items to skip"),
        ("page" = Option<i64>, Query, description = "Page number")
    ),
    responses(
        (status = 200, description = "Roles ordered by name", body = PaginatedRolesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn list_roles(
    State(state): State<AppState>,
    _guard: RequireRolesView,
    Query(params): Query<RoleFilterParams>,
) -> Result<Json<PaginatedRolesResponse>, AppError> {
    let roles = RoleService::list_roles(state.store.as_ref(), params).await?;
    Ok(Json(roles))
}

#[utoipa::path(
    post,
    path = "/api/admin/roles",
    request_body = CreateRoleDto,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 400, description = "Invalid request body"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "A role with the same slug exists"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    _guard: RequireRolesAdmin,
    ValidatedJson(dto): ValidatedJson<CreateRoleDto>,
) -> Result<(StatusCode, Json<Role>), AppError> {
    let role = RoleService::create_role(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    get,
    path = "/api/admin/roles/matrix",
    responses(
        (status = 200, description = "Module x role access grid", body = AccessMatrixResponse),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_access_matrix(
    State(state): State<AppState>,
    _guard: RequireRolesView,
) -> Result<Json<AccessMatrixResponse>, AppError> {
    let matrix = RoleService::get_access_matrix(state.store.as_ref()).await?;
    Ok(Json(matrix))
}

#[utoipa::path(
    get,
    path = "/api/admin/roles/{id}",
    params(("id" = String, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role details", body = Role),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_role(
    State(state): State<AppState>,
    _guard: RequireRolesView,
    Path(id): Path<String>,
) -> Result<Json<Role>, AppError> {
    let role = RoleService::get_role(state.store.as_ref(), &id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    put,
    path = "/api/admin/roles/{id}",
    params(("id" = String, Path, description = "Role id")),
    request_body = UpdateRoleDto,
    responses(
        (status = 200, description = "Role updated", body = Role),
        (status = 403, description = "Forbidden or renaming a system role"),
        (status = 404, description = "Role not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn update_role(
    State(state): State<AppState>,
    _guard: RequireRolesAdmin,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateRoleDto>,
) -> Result<Json<Role>, AppError> {
    let role = RoleService::update_role(state.store.as_ref(), &id, dto).await?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/admin/roles/{id}",
    params(("id" = String, Path, description = "Role id")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 403, description = "Forbidden or system role"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role is default or still has users")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn delete_role(
    State(state): State<AppState>,
    _guard: RequireRolesAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    RoleService::delete_role(state.store.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/admin/roles/{id}/modules/{module}",
    params(
        ("id" = String, Path, description = "Role id"),
        ("module" = String, Path, description = "Module id")
    ),
    request_body = SetModuleAccessDto,
    responses(
        (status = 200, description = "Matrix cell updated", body = Role),
        (status = 400, description = "Unknown module or level"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn set_module_access(
    State(state): State<AppState>,
    _guard: RequireRolesAdmin,
    Path((id, module)): Path<(String, String)>,
    ValidatedJson(dto): ValidatedJson<SetModuleAccessDto>,
) -> Result<Json<Role>, AppError> {
    let module: ModuleId = module.parse().map_err(|e: String| AppError::bad_request(anyhow!(e)))?;
    let role = RoleService::set_module_access(state.store.as_ref(), &id, module, dto.level).await?;
    Ok(Json(role))
}

#[utoipa::path(
    post,
    path = "/api/admin/roles/{id}/default",
    params(("id" = String, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role is now the default", body = Role),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn set_default_role(
    State(state): State<AppState>,
    _guard: RequireRolesAdmin,
    Path(id): Path<String>,
) -> Result<Json<Role>, AppError> {
    let role = RoleService::set_default_role(state.store.as_ref(), &id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    post,
    path = "/api/admin/roles/{id}/recalculate",
    params(("id" = String, Path, description = "Role id")),
    responses(
        (status = 200, description = "Counter before and after", body = RoleCount),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn recalculate_user_count(
    State(state): State<AppState>,
    _guard: RequireRolesAdmin,
    Path(id): Path<String>,
) -> Result<Json<RoleCount>, AppError> {
    let count = RoleService::recalculate_user_count(state.store.as_ref(), &id).await?;
    Ok(Json(count))
}

#[utoipa::path(
    post,
    path = "/api/admin/roles/recalculate",
    responses(
        (status = 200, description = "Counters of every role", body = RecountReport),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn recalculate_all_user_counts(
    State(state): State<AppState>,
    _guard: RequireRolesAdmin,
) -> Result<Json<RecountReport>, AppError> {
    let report = RoleService::recalculate_all_user_counts(state.store.as_ref()).await?;
    Ok(Json(report))
}
