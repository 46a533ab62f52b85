//! # Workhub Models
//!
//! Domain models and DTOs for the Workhub access service.
//!
//! - [`roles`]: Roles, the access matrix, and role DTOs
//! - [`users`]: Users, the tagged user-to-role link, and legacy role values
//! - [`migration`]: Reports and state of the legacy role migration

pub mod migration;
pub mod roles;
pub mod users;

pub use migration::{
    MigrateUsersReport, MigrationFailure, MigrationState, MigrationStatusResponse, RecountReport,
    RoleCount, SeedRolesReport,
};

pub use roles::{
    AccessMatrixResponse, AccessMatrixRow, CreateRoleDto, ModuleResponse, PaginatedRolesResponse,
    Role, RoleFilterParams, SetModuleAccessDto, UpdateRoleDto, generate_slug,
};

pub use users::{
    AssignRoleDto, BulkAssignFailure, BulkAssignResponse, BulkAssignRoleDto, CreateUserDto,
    LegacyRole, PaginatedUsersResponse, RoleAssignment, RoleAssignmentResponse, User,
    UserFilterParams, UserListParams, system_roles,
};
