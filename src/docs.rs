use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use workhub_core::{AccessLevel, ModuleId, PaginationMeta};
use workhub_models::{
    AccessMatrixResponse, AccessMatrixRow, AssignRoleDto, BulkAssignFailure, BulkAssignResponse,
    BulkAssignRoleDto, CreateRoleDto, CreateUserDto, LegacyRole, MigrateUsersReport,
    MigrationFailure, MigrationStatusResponse, ModuleResponse, PaginatedRolesResponse,
    PaginatedUsersResponse, RecountReport, Role, RoleAssignment, RoleAssignmentResponse,
    RoleCount, SeedRolesReport, SetModuleAccessDto, UpdateRoleDto, User,
};

use crate::modules::access::model::{
    AccessSource, EffectiveAccess, MeResponse, ModuleCheckResponse, ModuleLevel,
    MyAccessResponse,
};

/// Body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::access::controller::list_modules,
        crate::modules::access::controller::get_me,
        crate::modules::access::controller::get_my_access,
        crate::modules::access::controller::check_my_access,
        crate::modules::roles::controller::list_roles,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::get_access_matrix,
        crate::modules::roles::controller::get_role,
        crate::modules::roles::controller::update_role,
        crate::modules::roles::controller::delete_role,
        crate::modules::roles::controller::set_module_access,
        crate::modules::roles::controller::set_default_role,
        crate::modules::roles::controller::recalculate_user_count,
        crate::modules::roles::controller::recalculate_all_user_counts,
        crate::modules::users::controller::list_users,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::assign_role,
        crate::modules::users::controller::bulk_assign_role,
        crate::modules::migration::controller::get_status,
        crate::modules::migration::controller::seed_system_roles,
        crate::modules::migration::controller::migrate_users,
        crate::modules::migration::controller::recount,
        crate::modules::migration::controller::complete,
    ),
    components(
        schemas(
            AccessLevel,
            ModuleId,
            ModuleResponse,
            Role,
            CreateRoleDto,
            UpdateRoleDto,
            SetModuleAccessDto,
            PaginatedRolesResponse,
            AccessMatrixRow,
            AccessMatrixResponse,
            RoleCount,
            RecountReport,
            User,
            LegacyRole,
            RoleAssignment,
            CreateUserDto,
            AssignRoleDto,
            BulkAssignRoleDto,
            BulkAssignFailure,
            BulkAssignResponse,
            RoleAssignmentResponse,
            PaginatedUsersResponse,
            MigrationStatusResponse,
            SeedRolesReport,
            MigrationFailure,
            MigrateUsersReport,
            AccessSource,
            EffectiveAccess,
            MeResponse,
            ModuleLevel,
            MyAccessResponse,
            ModuleCheckResponse,
            PaginationMeta,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Access", description = "Current user and effective module access"),
        (name = "Roles", description = "Role management and the access matrix"),
        (name = "Users", description = "User directory and role assignment"),
        (name = "Roles Migration", description = "One-time move from legacy role values")
    ),
    info(
        title = "Workhub Access API",
        version = "0.1.0",
        description = "Role and module access administration for Workhub.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
