//! User models and the user-to-role link.
//!
//! A user's role is a tagged variant rather than two independent fields: either
//! a reference to a role document, a not-yet-migrated legacy value, or nothing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use workhub_core::serde::{deserialize_optional_bool, deserialize_optional_string};
use workhub_core::{PaginationMeta, PaginationParams};

/// Built-in role ids seeded by the role store.
pub mod system_roles {
    pub const ADMIN: &str = "admin";
    pub const MEMBER: &str = "member";
    pub const PENDING: &str = "pending";

    pub fn is_system_role(role_id: &str) -> bool {
        matches!(role_id, ADMIN | MEMBER | PENDING)
    }
}

/// Free-text role values of the pre-migration user model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LegacyRole {
    Admin,
    Owner,
    Member,
    Pending,
}

impl LegacyRole {
    pub const ALL: [LegacyRole; 4] = [
        LegacyRole::Admin,
        LegacyRole::Owner,
        LegacyRole::Member,
        LegacyRole::Pending,
    ];

    /// The role a legacy value migrates to.
    pub fn target_role_id(self) -> &'static str {
        match self {
            LegacyRole::Admin | LegacyRole::Owner => system_roles::ADMIN,
            LegacyRole::Member => system_roles::MEMBER,
            LegacyRole::Pending => system_roles::PENDING,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LegacyRole::Admin => "admin",
            LegacyRole::Owner => "owner",
            LegacyRole::Member => "member",
            LegacyRole::Pending => "pending",
        }
    }
}

impl fmt::Display for LegacyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LegacyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown legacy role: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleAssignment {
    Assigned { role_id: String },
    Legacy { role: LegacyRole },
    Unassigned,
}

impl RoleAssignment {
    pub fn assigned(role_id: impl Into<String>) -> Self {
        Self::Assigned {
            role_id: role_id.into(),
        }
    }

    pub fn role_id(&self) -> Option<&str> {
        match self {
            Self::Assigned { role_id } => Some(role_id),
            _ => None,
        }
    }

    pub fn legacy_role(&self) -> Option<LegacyRole> {
        match self {
            Self::Legacy { role } => Some(*role),
            _ => None,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy { .. })
    }

    /// Builds the variant from the two persisted columns. A role reference wins
    /// over a leftover legacy value; unknown legacy values count as unassigned.
    pub fn from_columns(role_id: Option<String>, legacy_role: Option<&str>) -> Self {
        match (role_id, legacy_role) {
            (Some(role_id), _) => Self::Assigned { role_id },
            (None, Some(legacy)) => match legacy.parse() {
                Ok(role) => Self::Legacy { role },
                Err(_) => Self::Unassigned,
            },
            (None, None) => Self::Unassigned,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: RoleAssignment,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, display_name: impl Into<String>, role: RoleAssignment) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            display_name: display_name.into(),
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

// DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Display name must be between 1 and 100 characters"
    ))]
    pub display_name: String,
    /// Role to assign; the default role is used when omitted
    pub role_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignRoleDto {
    #[validate(length(min = 1, message = "Role id is required"))]
    pub role_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkAssignRoleDto {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Between 1 and 500 user ids are required"
    ))]
    pub user_ids: Vec<Uuid>,
    #[validate(length(min = 1, message = "Role id is required"))]
    pub role_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkAssignFailure {
    pub user_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct BulkAssignResponse {
    pub role_id: String,
    pub assigned: Vec<Uuid>,
    pub unchanged: Vec<Uuid>,
    pub failed: Vec<BulkAssignFailure>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserFilterParams {
    /// Only users referencing this role
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub role_id: Option<String>,
    /// Only users still carrying a legacy role value
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub legacy: Option<bool>,
}

impl UserFilterParams {
    pub fn matches(&self, user: &User) -> bool {
        self.role_id
            .as_deref()
            .is_none_or(|role_id| user.role.role_id() == Some(role_id))
            && self.legacy.is_none_or(|legacy| user.role.is_legacy() == legacy)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserListParams {
    #[serde(flatten)]
    pub filter: UserFilterParams,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleAssignmentResponse {
    pub user_id: Uuid,
    pub previous_role_id: Option<String>,
    pub role_id: String,
    pub changed: bool,
}
