use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use workhub_core::AppError;
use workhub_models::{
    AssignRoleDto, BulkAssignResponse, BulkAssignRoleDto, CreateUserDto, PaginatedUsersResponse,
    RoleAssignmentResponse, User, UserListParams,
};

use crate::middleware::auth::{RequireUsersAdmin, RequireUsersView};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::UserService;

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("role_id" = Option<String>, Query, description = "Only users referencing this role"),
        ("legacy" = Option<bool>, Query, description = "Only users still on a legacy role"),
        ("limit" = Option<i64>, Query, description = "Items per page (1-100)"),
        ("offset" = Option<i64>, Query, description = "Items to skip"),
        ("page" = Option<i64>, Query, description = "Page number")
    ),
    responses(
        (status = 200, description = "Users ordered by email", body = PaginatedUsersResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    _guard: RequireUsersView,
    Query(params): Query<UserListParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let users = UserService::list_users(state.store.as_ref(), params).await?;
    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    _guard: RequireUsersAdmin,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = UserService::create_user(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    _guard: RequireUsersView,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = UserService::get_user(state.store.as_ref(), id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = AssignRoleDto,
    responses(
        (status = 200, description = "Role assigned", body = RoleAssignmentResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User or role not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn assign_role(
    State(state): State<AppState>,
    _guard: RequireUsersAdmin,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AssignRoleDto>,
) -> Result<Json<RoleAssignmentResponse>, AppError> {
    let result = UserService::assign_role(state.store.as_ref(), id, &dto.role_id).await?;
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/bulk-role",
    request_body = BulkAssignRoleDto,
    responses(
        (status = 200, description = "Per-user outcome", body = BulkAssignResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 422, description = "Empty or oversized id list")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn bulk_assign_role(
    State(state): State<AppState>,
    _guard: RequireUsersAdmin,
    ValidatedJson(dto): ValidatedJson<BulkAssignRoleDto>,
) -> Result<Json<BulkAssignResponse>, AppError> {
    let response = UserService::bulk_assign_role(state.store.as_ref(), dto).await?;
    Ok(Json(response))
}
