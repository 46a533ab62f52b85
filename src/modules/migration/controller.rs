use axum::{Json, extract::State};

use workhub_core::AppError;
use workhub_models::{MigrateUsersReport, MigrationStatusResponse, RecountReport, SeedRolesReport};

use crate::middleware::auth::RequireRolesAdmin;
use crate::state::AppState;

use super::service::MigrationService;

#[utoipa::path(
    get,
    path = "/api/admin/roles-migration/status",
    responses(
        (status = 200, description = "Migration progress", body = MigrationStatusResponse),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles Migration",
    security(("bearer_auth" = []))
)]
pub async fn get_status(
    State(state): State<AppState>,
    _guard: RequireRolesAdmin,
) -> Result<Json<MigrationStatusResponse>, AppError> {
    Ok(Json(MigrationService::status(state.store.as_ref()).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/roles-migration/seed",
    responses(
        (status = 200, description = "Created and existing system roles", body = SeedRolesReport),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles Migration",
    security(("bearer_auth" = []))
)]
pub async fn seed_system_roles(
    State(state): State<AppState>,
    _guard: RequireRolesAdmin,
) -> Result<Json<SeedRolesReport>, AppError> {
    Ok(Json(
        MigrationService::seed_system_roles(state.store.as_ref()).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/roles-migration/users",
    responses(
        (status = 200, description = "Per-run migration report", body = MigrateUsersReport),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles Migration",
    security(("bearer_auth" = []))
)]
pub async fn migrate_users(
    State(state): State<AppState>,
    _guard: RequireRolesAdmin,
) -> Result<Json<MigrateUsersReport>, AppError> {
    Ok(Json(
        MigrationService::migrate_users(state.store.as_ref()).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/roles-migration/recount",
    responses(
        (status = 200, description = "Counters of every role", body = RecountReport),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles Migration",
    security(("bearer_auth" = []))
)]
pub async fn recount(
    State(state): State<AppState>,
    _guard: RequireRolesAdmin,
) -> Result<Json<RecountReport>, AppError> {
    Ok(Json(MigrationService::recount(state.store.as_ref()).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/roles-migration/complete",
    responses(
        (status = 200, description = "Migration marked complete", body = MigrationStatusResponse),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Legacy users remain")
    ),
    tag = "Roles Migration",
    security(("bearer_auth" = []))
)]
pub async fn complete(
    State(state): State<AppState>,
    _guard: RequireRolesAdmin,
) -> Result<Json<MigrationStatusResponse>, AppError> {
    Ok(Json(MigrationService::complete(state.store.as_ref()).await?))
}
