//! Role store abstraction.
//!
//! The [`RoleStore`] trait is the persistence seam for roles, users and the
//! migration flag. Services only talk to this trait; the backend is picked at
//! startup from [`workhub_config::StorageConfig`].
//!
//! Writes that touch more than one record (the default flag, the member
//! counters on reassignment) are a single call so each backend can apply them
//! atomically.

use async_trait::async_trait;
use uuid::Uuid;

use workhub_models::{MigrationState, Role, User, UserFilterParams};

use crate::error::StoreResult;

/// Outcome of pointing a user at a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleChange {
    pub previous_role_id: Option<String>,
    pub changed: bool,
}

/// Users grouped by the shape of their role link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserKindCounts {
    pub legacy: i64,
    pub assigned: i64,
    pub unassigned: i64,
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// All roles ordered by name.
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    async fn get_role(&self, id: &str) -> StoreResult<Option<Role>>;

    async fn get_default_role(&self) -> StoreResult<Option<Role>>;

    /// Inserts a new role.
    ///
    /// Returns `StoreError::Conflict` if the id is taken.
    async fn insert_role(&self, role: &Role) -> StoreResult<()>;

    /// Persists name, description and modules of an existing role and returns
    /// the stored row. Flags and counters are left untouched.
    async fn update_role(&self, role: &Role) -> StoreResult<Role>;

    /// Returns `StoreError::Conflict` if users still reference the role.
    async fn delete_role(&self, id: &str) -> StoreResult<()>;

    /// Clears the default flag everywhere and sets it on `id` in one write.
    async fn set_default_role(&self, id: &str) -> StoreResult<()>;

    /// Overwrites the maintained member counter.
    async fn set_users_count(&self, id: &str, count: i64) -> StoreResult<()>;

    /// Filtered users ordered by email, plus the total matching count.
    async fn list_users(
        &self,
        filter: &UserFilterParams,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<User>, i64)>;

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Case-insensitive lookup by email.
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Inserts a user and bumps the counter of its assigned role, if any.
    ///
    /// Returns `StoreError::Conflict` if the email is taken and
    /// `StoreError::NotFound` if the assigned role does not exist.
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Points the user at `role_id`, moving one count from the previous role
    /// to the new one. A no-op when the user already references `role_id`.
    async fn set_user_role(&self, user_id: Uuid, role_id: &str) -> StoreResult<RoleChange>;

    /// Live number of users referencing `role_id`.
    async fn count_users_with_role(&self, role_id: &str) -> StoreResult<i64>;

    async fn count_users_by_kind(&self) -> StoreResult<UserKindCounts>;

    /// Users without a role reference (legacy or unassigned), ordered by email.
    async fn list_unmigrated_users(&self) -> StoreResult<Vec<User>>;

    async fn migration_state(&self) -> StoreResult<MigrationState>;

    async fn set_migration_state(&self, state: &MigrationState) -> StoreResult<()>;
}
