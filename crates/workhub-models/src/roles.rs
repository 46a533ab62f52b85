//! Role domain models and DTOs.
//!
//! A role grants one [`AccessLevel`] per [`ModuleId`]. Roles are identified by a
//! slug derived from their name when they are created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use workhub_core::access::{self, AccessLevel, ModuleAccess, ModuleId, ModuleInfo};
use workhub_core::serde::deserialize_optional_bool;
use workhub_core::{PaginationMeta, PaginationParams};

/// Generate a slug from a name
/// Converts to lowercase, replaces spaces and hyphens with underscores,
/// folds other characters to underscores, and collapses runs of underscores
pub fn generate_slug(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut result = String::new();
    let mut prev_underscore = false;
    for c in slug.chars() {
        if c == '_' {
            if !prev_underscore && !result.is_empty() {
                result.push(c);
            }
            prev_underscore = true;
        } else {
            result.push(c);
            prev_underscore = false;
        }
    }

    result.trim_end_matches('_').to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_system: bool,
    pub is_default: bool,
    /// Module id to access level; modules without an entry are `none`
    #[schema(value_type = Object)]
    pub modules: ModuleAccess,
    pub users_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// A user-defined role with no members.
    pub fn custom(
        id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        modules: ModuleAccess,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description,
            is_system: false,
            is_default: false,
            modules: access::normalize_modules(modules),
            users_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn module_access(&self, module: ModuleId) -> AccessLevel {
        access::module_access(&self.modules, module)
    }

    pub fn allows(&self, module: ModuleId, required: AccessLevel) -> bool {
        self.module_access(module).satisfies(required)
    }
}

// DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoleDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    /// Initial access matrix row; omitted modules are `none`
    #[schema(value_type = Option<Object>)]
    pub modules: Option<ModuleAccess>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    /// Replaces the whole access matrix row when present
    #[schema(value_type = Option<Object>)]
    pub modules: Option<ModuleAccess>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetModuleAccessDto {
    pub level: AccessLevel,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleFilterParams {
    /// Only system (or only custom) roles
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_system: Option<bool>,
    /// Only the default role (or only non-default roles)
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_default: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl RoleFilterParams {
    pub fn matches(&self, role: &Role) -> bool {
        self.is_system.is_none_or(|v| role.is_system == v)
            && self.is_default.is_none_or(|v| role.is_default == v)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedRolesResponse {
    pub data: Vec<Role>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleResponse {
    pub id: ModuleId,
    pub label: String,
    pub description: String,
}

impl From<&ModuleInfo> for ModuleResponse {
    fn from(info: &ModuleInfo) -> Self {
        Self {
            id: info.id,
            label: info.label.to_string(),
            description: info.description.to_string(),
        }
    }
}

/// One row of the access matrix: a role and its level on every module.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccessMatrixRow {
    pub role_id: String,
    pub role_name: String,
    pub is_system: bool,
    pub is_default: bool,
    /// Level for every module in table order, including `none`
    pub levels: Vec<AccessLevel>,
}

/// Modules × roles grid backing the matrix editor.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccessMatrixResponse {
    pub modules: Vec<ModuleResponse>,
    pub roles: Vec<AccessMatrixRow>,
}

impl AccessMatrixResponse {
    pub fn build(roles: &[Role]) -> Self {
        let modules: Vec<ModuleResponse> = access::MODULES.iter().map(Into::into).collect();
        let roles = roles
            .iter()
            .map(|role| AccessMatrixRow {
                role_id: role.id.clone(),
                role_name: role.name.clone(),
                is_system: role.is_system,
                is_default: role.is_default,
                levels: modules
                    .iter()
                    .map(|module| role.module_access(module.id))
                    .collect(),
            })
            .collect();

        Self { modules, roles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_slug() {
        assert_eq!(generate_slug("Project Manager"), "project_manager");
        assert_eq!(generate_slug("  QA -- Lead!! "), "qa_lead");
        assert_eq!(generate_slug("Mentor (2024)"), "mentor_2024");
        assert_eq!(generate_slug("***"), "");
    }

    #[test]
    fn test_custom_role_drops_none_levels() {
        let mut modules = ModuleAccess::new();
        modules.insert(ModuleId::Tasks, AccessLevel::Edit);
        modules.insert(ModuleId::Roles, AccessLevel::None);

        let role = Role::custom("mentor", "Mentor", None, modules);
        assert!(!role.is_system);
        assert!(!role.is_default);
        assert_eq!(role.users_count, 0);
        assert_eq!(role.modules.len(), 1);
        assert!(role.allows(ModuleId::Tasks, AccessLevel::View));
        assert!(!role.allows(ModuleId::Tasks, AccessLevel::Admin));
        assert_eq!(role.module_access(ModuleId::Roles), AccessLevel::None);
    }

    #[test]
    fn test_filter_matches() {
        let role = Role::custom("mentor", "Mentor", None, ModuleAccess::new());
        let filter = RoleFilterParams {
            is_system: Some(false),
            is_default: None,
            pagination: PaginationParams::default(),
        };
        assert!(filter.matches(&role));

        let filter = RoleFilterParams {
            is_system: Some(true),
            is_default: None,
            pagination: PaginationParams::default(),
        };
        assert!(!filter.matches(&role));
    }

    #[test]
    fn test_matrix_has_a_level_per_module() {
        let mut modules = ModuleAccess::new();
        modules.insert(ModuleId::Dashboard, AccessLevel::View);
        let role = Role::custom("viewer", "Viewer", None, modules);

        let matrix = AccessMatrixResponse::build(&[role]);
        assert_eq!(matrix.roles.len(), 1);
        assert_eq!(matrix.roles[0].levels.len(), matrix.modules.len());
        assert_eq!(matrix.roles[0].levels[0], AccessLevel::View);
        assert!(
            matrix.roles[0].levels[1..]
                .iter()
                .all(|level| *level == AccessLevel::None)
        );
    }
}
