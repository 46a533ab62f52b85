//! Models for the one-time move from legacy role strings to role references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Persisted completion flag of the role migration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MigrationState {
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MigrationStatusResponse {
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub legacy_users: i64,
    pub assigned_users: i64,
    pub unassigned_users: i64,
    /// Built-in roles not yet present in the store
    pub missing_system_roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct SeedRolesReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MigrationFailure {
    pub user_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct MigrateUsersReport {
    pub migrated: i64,
    pub skipped: i64,
    pub failed: Vec<MigrationFailure>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleCount {
    pub role_id: String,
    pub previous: i64,
    pub current: i64,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct RecountReport {
    pub roles: Vec<RoleCount>,
}

impl RecountReport {
    /// Roles whose stored counter had drifted.
    pub fn corrected(&self) -> impl Iterator<Item = &RoleCount> {
        self.roles.iter().filter(|c| c.previous != c.current)
    }
}
